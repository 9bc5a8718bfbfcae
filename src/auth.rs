use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: String,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn resolve(
        auth: Option<Authorization<Bearer>>,
        query_token: Option<&str>,
    ) -> Result<Self, ApiError> {
        let provided = auth
            .map(|a| a.token().to_string())
            .or_else(|| query_token.map(|s| s.to_string()))
            .filter(|t| !t.trim().is_empty());
        match provided {
            Some(token) => Ok(Self::new(token)),
            None => Err(ApiError::Unauthorized("Missing authentication token".into())),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    // Signature is not verified; the gym API stays the authority.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let header = decode_header(&self.token).ok()?;
        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.insecure_disable_signature_validation();

        let data = decode::<ExpiryClaim>(&self.token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?;
        DateTime::from_timestamp(data.claims.exp?, 0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    pub fn ensure_fresh(self, now: DateTime<Utc>) -> Result<Self, ApiError> {
        if self.is_expired(now) {
            return Err(ApiError::Unauthorized("Authentication token expired".into()));
        }
        Ok(self)
    }
}
