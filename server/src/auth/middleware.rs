//! Identity extractors.
//!
//! Credentials are verified by the gateway in front of this server, which
//! forwards the caller's identity in the `x-user-id` and `x-user-role`
//! headers. These extractors only read and type those headers.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use mover_engine::{require_client, require_mover, ClientId, Error, Identity, MoverId, Role};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Read the identity headers. Returns `None` if either is missing or malformed.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())?;
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Role>().ok())?;
    Some(Identity { user_id, role })
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers)
            .map(AuthUser)
            .ok_or(AppError::Engine(Error::Unauthenticated))
    }
}

/// Optional authenticated user - doesn't reject if missing.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(identity_from_headers(&parts.headers)))
    }
}

/// An authenticated client. Rejects anonymous callers (401) and movers (403).
#[derive(Debug, Clone, Copy)]
pub struct ClientUser(pub ClientId);

impl<S> FromRequestParts<S> for ClientUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers);
        Ok(ClientUser(require_client(identity.as_ref())?))
    }
}

/// An authenticated mover. Rejects anonymous callers (401) and clients (403).
#[derive(Debug, Clone, Copy)]
pub struct MoverUser(pub MoverId);

impl<S> FromRequestParts<S> for MoverUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers);
        Ok(MoverUser(require_mover(identity.as_ref())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        headers
    }

    #[test]
    fn reads_identity() {
        let id = Uuid::new_v4();
        let identity = identity_from_headers(&headers(&id.to_string(), "client")).unwrap();
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.role, Role::Client);
    }

    #[test]
    fn malformed_identity_is_absent() {
        assert!(identity_from_headers(&HeaderMap::new()).is_none());
        assert!(identity_from_headers(&headers("nope", "client")).is_none());
        assert!(identity_from_headers(&headers(&Uuid::new_v4().to_string(), "admin")).is_none());
    }
}
