use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::fitness::{
    ActivityLevel, BmiCategory, CalculatorInput, CalculatorResult, FitnessGoal, Gender, Macros,
    Units,
};
use crate::handlers::{ClassTypesResponse, DayResponse, ScheduleResponse, StatsResponse};
use crate::models::{ClassType, RejectedRecord, Session, SessionView};
use crate::schedule::{DayCell, ScheduleGrid, ScheduleStats, ViewMode};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_schedule,
        crate::handlers::get_day,
        crate::handlers::get_stats,
        crate::handlers::get_ical,
        crate::handlers::get_class_types,
        crate::handlers::post_calculator
    ),
    components(schemas(
        Session,
        SessionView,
        RejectedRecord,
        ClassType,
        ViewMode,
        DayCell,
        ScheduleGrid,
        ScheduleStats,
        ScheduleResponse,
        DayResponse,
        StatsResponse,
        ClassTypesResponse,
        CalculatorInput,
        CalculatorResult,
        Macros,
        BmiCategory,
        Units,
        Gender,
        ActivityLevel,
        FitnessGoal
    )),
    tags(
        (name = "schedule", description = "Trainer schedule operations"),
        (name = "fitness", description = "Member fitness calculator")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_schedule_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/schedule"));
        assert!(doc.paths.paths.contains_key("/schedule/day/{date}"));
        assert!(doc.paths.paths.contains_key("/calculator"));
    }
}
