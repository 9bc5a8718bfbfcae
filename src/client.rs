use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::auth::SessionContext;
use crate::models::{ClassType, SessionFeed};

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("gym API rejected the token")]
    Unauthorized,
    #[error("gym API denied access: {0}")]
    Forbidden(String),
    #[error("gym API returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("gym API did not answer in time")]
    Timeout,
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(reqwest::Error),
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiClientError::Timeout
        } else if err.is_decode() {
            ApiClientError::Decode(err)
        } else {
            ApiClientError::Http(err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionsEnvelope {
    sessions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ClassTypesEnvelope {
    class_types: Vec<ClassType>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin reqwest wrapper around the gym API's session endpoints.
#[derive(Clone)]
pub struct GymApiClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
}

impl GymApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiClientError::Http)?;
        Ok(Self {
            client,
            base_url: Arc::new(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        ctx: &SessionContext,
    ) -> Result<T, ApiClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "fetching from gym API");
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(ctx.token())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiClientError::Unauthorized,
                StatusCode::FORBIDDEN => ApiClientError::Forbidden(message),
                _ => ApiClientError::Upstream { status, message },
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetches the caller's sessions and validates every record.
    pub async fn fetch_sessions(&self, ctx: &SessionContext) -> Result<SessionFeed, ApiClientError> {
        let envelope: SessionsEnvelope = self.get_json("sessions", ctx).await?;
        let feed = SessionFeed::from_values(envelope.sessions);
        tracing::debug!(
            accepted = feed.sessions.len(),
            rejected = feed.rejected.len(),
            "session feed decoded"
        );
        Ok(feed)
    }

    pub async fn fetch_class_types(
        &self,
        ctx: &SessionContext,
    ) -> Result<Vec<ClassType>, ApiClientError> {
        let envelope: ClassTypesEnvelope = self.get_json("sessions/class-types", ctx).await?;
        Ok(envelope.class_types)
    }
}
