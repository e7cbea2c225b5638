//! Bearer token extraction.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AppState;
use crate::error::Error;
use crate::services::Identity;
use crate::unit_of_work::UnitOfWork;

/// Resolves the caller from `Authorization: Bearer <token>`.
///
/// Missing, malformed, expired or forged tokens are rejected with 401.
impl<U: UnitOfWork> FromRequestParts<AppState<U>> for Identity {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Authentication("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Authentication("missing bearer token".to_string()))?;

        state.tokens().verify(token)
    }
}
