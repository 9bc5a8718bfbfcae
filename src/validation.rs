use chrono::{Datelike, NaiveDate};

use crate::error::ApiError;
use crate::fitness::CalculatorInput;
use crate::schedule::{ViewMode, earliest_date, latest_date};

pub const MAX_STEP: i32 = 1200;

pub fn parse_date(value: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(fallback),
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("date must be YYYY-MM-DD, got '{raw}'"))
            })?;
            if !(earliest_date()..=latest_date()).contains(&date) {
                return Err(ApiError::BadRequest(format!(
                    "date year must be between {} and {}, got '{raw}'",
                    earliest_date().year(),
                    latest_date().year()
                )));
            }
            Ok(date)
        }
    }
}

pub fn parse_view(value: Option<&str>) -> Result<ViewMode, ApiError> {
    match value {
        None => Ok(ViewMode::default()),
        Some(raw) => raw.parse().map_err(ApiError::BadRequest),
    }
}

pub fn validate_step(value: i32) -> Result<i32, ApiError> {
    if (-MAX_STEP..=MAX_STEP).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "step must be between -{MAX_STEP} and {MAX_STEP}"
        )))
    }
}

pub fn validate_calculator_input(input: CalculatorInput) -> Result<CalculatorInput, ApiError> {
    if !(input.height.is_finite() && input.height > 0.0) {
        return Err(ApiError::BadRequest("height must be greater than 0".into()));
    }
    if !(input.weight.is_finite() && input.weight > 0.0) {
        return Err(ApiError::BadRequest("weight must be greater than 0".into()));
    }
    if !(1..=120).contains(&input.age) {
        return Err(ApiError::BadRequest("age must be between 1 and 120".into()));
    }
    Ok(input)
}
