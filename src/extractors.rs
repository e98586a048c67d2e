use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Identity of the caller, as asserted by the upstream auth gateway.
/// Token verification happens before requests reach this service; all we
/// see is the `X-User-Id` header the gateway injects.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .ok_or_else(|| AppError::Authentication("Missing X-User-Id header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Authentication("Malformed X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Authentication("X-User-Id is not a valid UUID".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
