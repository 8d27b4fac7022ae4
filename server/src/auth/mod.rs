//! Identity extraction for requests.

mod middleware;

pub use middleware::*;
