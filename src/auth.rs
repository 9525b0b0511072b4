use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Header set by the identity provider in front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// The authenticated user every read and write is scoped to.
///
/// Extract `Option<Owner>` on routes that answer unauthenticated callers
/// with an empty result instead of 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Uuid);

impl Owner {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_HEADER)?
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(Owner)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Owner::from_headers(&parts.headers).ok_or(ApiError::Unauthenticated)
    }
}
