use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::{NaiveDate, Utc};
use futures::future::try_join;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::SessionContext,
    error::ApiError,
    fitness::{self, CalculatorInput, CalculatorResult},
    models::{ClassType, RejectedRecord, SessionView},
    schedule::{self, ClassFilter, ScheduleGrid, ScheduleStats},
    validation::{parse_date, parse_view, validate_calculator_input, validate_step},
};

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    pub view: Option<String>,
    pub date: Option<String>,
    pub class_type: Option<String>,
    #[serde(default)]
    pub step: i32,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub class_type: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    #[serde(flatten)]
    pub grid: ScheduleGrid,
    pub class_types: Vec<String>,
    pub stats: ScheduleStats,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub filter: String,
    pub sessions: Vec<SessionView>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub filter: String,
    #[serde(flatten)]
    pub stats: ScheduleStats,
    pub rejected_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassTypesResponse {
    pub class_types: Vec<ClassType>,
    pub in_schedule: Vec<String>,
}

fn authorize(
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    query_token: Option<&str>,
) -> Result<SessionContext, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    SessionContext::resolve(auth_header, query_token)?.ensure_fresh(Utc::now())
}

#[utoipa::path(get, path = "/", tag = "schedule")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Gym Schedule API",
        "endpoints": {
            "/schedule": "Month or week calendar grid of the trainer's sessions",
            "/schedule/day/{date}": "Sessions of a single day",
            "/schedule/stats": "Session and booking totals",
            "/schedule.ical": "Download sessions as iCal file",
            "/class-types": "Available class types",
            "/calculator": "BMI, BMR, TDEE and macro calculator"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "schedule")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "schedule")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/schedule",
    params(
        ("view" = Option<String>, Query, description = "month (default) or week"),
        ("date" = Option<String>, Query, description = "Reference date YYYY-MM-DD, defaults to today"),
        ("class_type" = Option<String>, Query, description = "Class type filter, 'all' by default"),
        ("step" = Option<i32>, Query, description = "Periods to move the reference date by"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Calendar grid", body = ScheduleResponse),
        (status = 400, description = "Invalid query parameter"),
        (status = 401, description = "Missing or rejected authentication token"),
        (status = 502, description = "Gym API failure"),
        (status = 504, description = "Gym API timed out")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authorize(auth, query.token.as_deref())?;

    let view = parse_view(query.view.as_deref())?;
    let step = validate_step(query.step)?;
    let today = schedule::today(state.tz);
    let mut reference = parse_date(query.date.as_deref(), today)?;
    if step != 0 {
        reference = schedule::advance(reference, view, step);
    }
    let filter = ClassFilter::parse(query.class_type.as_deref());

    let feed = state.client.fetch_sessions(&ctx).await?;
    let grid = schedule::build_grid(reference, view, &feed.sessions, &filter, today);
    tracing::debug!(%view, %reference, cells = grid.cells.len(), "schedule grid built");

    Ok(Json(ScheduleResponse {
        grid,
        class_types: schedule::class_types(&feed.sessions),
        stats: schedule::stats(&feed.sessions, &filter),
        rejected: feed.rejected,
    }))
}

#[utoipa::path(
    get,
    path = "/schedule/day/{date}",
    params(
        ("date" = String, Path, description = "Day YYYY-MM-DD"),
        ("class_type" = Option<String>, Query, description = "Class type filter, 'all' by default"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Sessions of the day ordered by start time", body = DayResponse),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Missing or rejected authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_day(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(date): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authorize(auth, query.token.as_deref())?;
    let date = parse_date(Some(date.as_str()), schedule::today(state.tz))?;
    let filter = ClassFilter::parse(query.class_type.as_deref());

    let feed = state.client.fetch_sessions(&ctx).await?;
    let sessions = schedule::sessions_on_date(date, &feed.sessions, &filter);

    Ok(Json(DayResponse {
        date,
        filter: filter.as_str().to_string(),
        sessions: sessions.iter().map(SessionView::from).collect(),
        rejected: feed.rejected,
    }))
}

#[utoipa::path(
    get,
    path = "/schedule/stats",
    params(
        ("class_type" = Option<String>, Query, description = "Class type filter, 'all' by default"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Session totals", body = StatsResponse),
        (status = 401, description = "Missing or rejected authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authorize(auth, query.token.as_deref())?;
    let filter = ClassFilter::parse(query.class_type.as_deref());

    let feed = state.client.fetch_sessions(&ctx).await?;
    Ok(Json(StatsResponse {
        filter: filter.as_str().to_string(),
        stats: schedule::stats(&feed.sessions, &filter),
        rejected_count: feed.rejected.len(),
    }))
}

#[utoipa::path(
    get,
    path = "/schedule.ical",
    params(
        ("class_type" = Option<String>, Query, description = "Class type filter, 'all' by default"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 401, description = "Missing or rejected authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_ical(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authorize(auth, query.token.as_deref())?;
    let filter = ClassFilter::parse(query.class_type.as_deref());

    let feed = state.client.fetch_sessions(&ctx).await?;
    let mut sessions: Vec<_> = feed
        .sessions
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();
    sessions.sort_by_key(|s| (s.date, s.start_time, s.end_time));

    let body = state.exporter.generate(&sessions);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=gym_schedule.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/class-types",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Class type catalog and the types present in the schedule", body = ClassTypesResponse),
        (status = 401, description = "Missing or rejected authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_class_types(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authorize(auth, query.token.as_deref())?;

    let (class_types, feed) = try_join(
        state.client.fetch_class_types(&ctx),
        state.client.fetch_sessions(&ctx),
    )
    .await?;

    Ok(Json(ClassTypesResponse {
        class_types,
        in_schedule: schedule::class_types(&feed.sessions),
    }))
}

#[utoipa::path(
    post,
    path = "/calculator",
    request_body = CalculatorInput,
    responses(
        (status = 200, description = "Calculation result", body = CalculatorResult),
        (status = 400, description = "Invalid measurements")
    ),
    tag = "fitness"
)]
pub async fn post_calculator(
    Json(input): Json<CalculatorInput>,
) -> Result<Json<CalculatorResult>, ApiError> {
    let input = validate_calculator_input(input)?;
    Ok(Json(fitness::calculate(&input)))
}
