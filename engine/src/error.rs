//! Error types for the marketplace engine.

use crate::{ClientId, EstimateId, MoverId, RequestId, ReviewId};
use thiserror::Error;

/// Broad failure classes. Transports map these onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No identity context was supplied.
    Unauthenticated,
    /// The identity is known but may not perform the operation.
    Forbidden,
    /// A referenced entity does not resolve.
    NotFound,
    /// Structurally bad input.
    Validation,
    /// Well-formed input that breaks a domain rule.
    DomainConflict,
    /// Valid input that is not allowed in the current entity state.
    StateConflict,
}

/// All possible errors from the marketplace engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    // Identity errors
    #[error("authentication required")]
    Unauthenticated,

    #[error("this operation requires the {0} role")]
    RoleRequired(&'static str),

    #[error("{resource} {id} belongs to another client")]
    NotOwner { resource: &'static str, id: String },

    // Lookup errors
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("mover not found: {0}")]
    MoverNotFound(MoverId),

    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("estimate not found: {0}")]
    EstimateNotFound(EstimateId),

    #[error("review not found: {0}")]
    ReviewNotFound(ReviewId),

    // Validation errors
    #[error("estimate does not exist: {0}")]
    UnknownEstimate(EstimateId),

    #[error("invalid {resource} id: '{value}'")]
    InvalidId { resource: &'static str, value: String },

    #[error("page must be a positive integer, got '{0}'")]
    InvalidPage(String),

    #[error("unknown sort key: '{0}'")]
    UnknownSortKey(String),

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("client {client} does not own request {request}")]
    RequestClientMismatch { request: RequestId, client: ClientId },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    // Domain conflicts
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    #[error("review content must be at least {min} characters, got {actual}")]
    ContentTooShort { min: usize, actual: usize },

    // State conflicts
    #[error("estimate {0} has not been confirmed by the client")]
    EstimateNotConfirmed(EstimateId),

    #[error("estimate {0} already has a review")]
    ReviewAlreadyExists(EstimateId),

    #[error("mover {mover} already submitted an estimate for request {request}")]
    EstimateAlreadySubmitted { request: RequestId, mover: MoverId },
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthenticated => ErrorKind::Unauthenticated,
            Error::RoleRequired(_) | Error::NotOwner { .. } => ErrorKind::Forbidden,
            Error::ClientNotFound(_)
            | Error::MoverNotFound(_)
            | Error::RequestNotFound(_)
            | Error::EstimateNotFound(_)
            | Error::ReviewNotFound(_) => ErrorKind::NotFound,
            Error::UnknownEstimate(_)
            | Error::InvalidId { .. }
            | Error::InvalidPage(_)
            | Error::UnknownSortKey(_)
            | Error::InvalidField { .. }
            | Error::RequestClientMismatch { .. }
            | Error::InvalidSnapshot(_) => ErrorKind::Validation,
            Error::RatingOutOfRange(_) | Error::ContentTooShort { .. } => {
                ErrorKind::DomainConflict
            }
            Error::EstimateNotConfirmed(_)
            | Error::ReviewAlreadyExists(_)
            | Error::EstimateAlreadySubmitted { .. } => ErrorKind::StateConflict,
        }
    }

    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::RatingOutOfRange(6);
        assert_eq!(err.to_string(), "rating must be between 1 and 5, got 6");

        let err = Error::ContentTooShort { min: 10, actual: 2 };
        assert_eq!(
            err.to_string(),
            "review content must be at least 10 characters, got 2"
        );

        let err = Error::InvalidPage("0".into());
        assert_eq!(err.to_string(), "page must be a positive integer, got '0'");
    }

    #[test]
    fn rating_and_duplicate_are_distinct_kinds() {
        let estimate = EstimateId::new();
        assert_eq!(Error::RatingOutOfRange(0).kind(), ErrorKind::DomainConflict);
        assert_eq!(
            Error::ContentTooShort { min: 10, actual: 2 }.kind(),
            ErrorKind::DomainConflict
        );
        assert_eq!(
            Error::ReviewAlreadyExists(estimate).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            Error::UnknownEstimate(estimate).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::EstimateNotFound(estimate).kind(),
            ErrorKind::NotFound
        );
    }
}
