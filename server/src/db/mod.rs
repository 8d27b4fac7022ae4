//! Database module for PostgreSQL persistence.
//!
//! Functions here run single statements against any executor. The
//! transactions that combine them live in the Postgres backend.

mod clients;
mod estimates;
mod favorites;
mod movers;
mod pool;
mod reviews;
mod rows;

pub use clients::*;
pub use estimates::*;
pub use favorites::*;
pub use movers::*;
pub use pool::*;
pub use reviews::*;
pub use rows::{
    ClientRow, EstimateRow, FavoriteMoverRow, MoverRow, RequestRow, ReviewRow, ReviewViewRow,
    WritableEstimateRow,
};

/// Unique constraint backing "one review per estimate".
pub const REVIEWS_ESTIMATE_KEY: &str = "reviews_estimate_id_key";

/// Unique constraint backing "one estimate per mover and request".
pub const ESTIMATES_REQUEST_MOVER_KEY: &str = "estimates_request_mover_key";

/// Check if a SQL error is a unique violation of `constraint`.
pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    violates(e, "23505", constraint)
}

/// Check if a SQL error is a foreign key violation of any constraint.
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        db_err.code().is_some_and(|c| c == "23503")
    } else {
        false
    }
}

fn violates(e: &sqlx::Error, code: &str, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        db_err.code().is_some_and(|c| c == code) && db_err.constraint() == Some(constraint)
    } else {
        false
    }
}
