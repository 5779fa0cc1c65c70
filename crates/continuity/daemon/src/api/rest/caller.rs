//! Authenticated caller extracted from request headers.
//!
//! The authenticating proxy in front of the daemon resolves the session and
//! forwards the tenant and user as headers. A request without both is
//! rejected before any engine call.

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use continuity_types::{TenantId, UserId};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Caller {
    pub tenant: TenantId,
    pub user: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
        };

        Ok(Caller {
            tenant: TenantId::new(header(TENANT_HEADER)?),
            user: UserId::new(header(USER_HEADER)?),
        })
    }
}
