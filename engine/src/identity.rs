//! Identity context supplied by the caller.
//!
//! The engine trusts the identity as given; verifying credentials happens
//! upstream. Operations only check presence and role.

use crate::{error::Result, ClientId, Error, MoverId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Mover,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Mover => "mover",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "mover" => Ok(Role::Mover),
            _ => Err(Error::Unauthenticated),
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn client(id: ClientId) -> Self {
        Self {
            user_id: id.as_uuid(),
            role: Role::Client,
        }
    }

    pub fn mover(id: MoverId) -> Self {
        Self {
            user_id: id.as_uuid(),
            role: Role::Mover,
        }
    }

    /// The client id, if this identity is a client.
    pub fn as_client(&self) -> Option<ClientId> {
        (self.role == Role::Client).then(|| ClientId::from_uuid(self.user_id))
    }
}

/// Require a client identity.
///
/// A missing identity short-circuits with `Unauthenticated` before any role check.
pub fn require_client(identity: Option<&Identity>) -> Result<ClientId> {
    let identity = identity.ok_or(Error::Unauthenticated)?;
    identity
        .as_client()
        .ok_or(Error::RoleRequired(Role::Client.as_str()))
}

/// Require a mover identity.
pub fn require_mover(identity: Option<&Identity>) -> Result<MoverId> {
    let identity = identity.ok_or(Error::Unauthenticated)?;
    match identity.role {
        Role::Mover => Ok(MoverId::from_uuid(identity.user_id)),
        Role::Client => Err(Error::RoleRequired(Role::Mover.as_str())),
    }
}

/// The viewing client, if any. Movers and anonymous callers view as nobody.
pub fn viewer(identity: Option<&Identity>) -> Option<ClientId> {
    identity.and_then(Identity::as_client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn missing_identity_is_unauthenticated() {
        let err = require_client(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let mover = Identity::mover(MoverId::new());
        let err = require_client(Some(&mover)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let client = Identity::client(ClientId::new());
        let err = require_mover(Some(&client)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn movers_view_anonymously() {
        let mover = Identity::mover(MoverId::new());
        assert_eq!(viewer(Some(&mover)), None);

        let client_id = ClientId::new();
        let client = Identity::client(client_id);
        assert_eq!(viewer(Some(&client)), Some(client_id));
    }

    #[test]
    fn role_parsing() {
        assert_eq!("Client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("mover".parse::<Role>().unwrap(), Role::Mover);
        assert!("admin".parse::<Role>().is_err());
    }
}
