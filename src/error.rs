use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::client::ApiClientError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<ApiClientError> for ApiError {
    fn from(value: ApiClientError) -> Self {
        match value {
            ApiClientError::Unauthorized => {
                ApiError::Unauthorized("Invalid authentication token".into())
            }
            ApiClientError::Forbidden(msg) => ApiError::Forbidden(msg),
            ApiClientError::Timeout => {
                error!("gym API timed out");
                ApiError::GatewayTimeout("Gym API did not respond in time".into())
            }
            ApiClientError::Upstream { status, message } => {
                error!(%status, %message, "gym API error");
                ApiError::BadGateway(format!("Gym API returned {status}"))
            }
            ApiClientError::Http(err) => {
                error!("HTTP error: {err}");
                ApiError::BadGateway("Failed to reach gym API".into())
            }
            ApiClientError::Decode(err) => {
                error!("decode error: {err}");
                ApiError::BadGateway("Gym API sent an unexpected response".into())
            }
            ApiClientError::Url(err) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_gateway_statuses() {
        let timeout = ApiError::from(ApiClientError::Timeout).into_response();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let upstream = ApiError::from(ApiClientError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        })
        .into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let denied = ApiError::from(ApiClientError::Unauthorized).into_response();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    }
}
