//! # Mover Engine
//!
//! The interaction lifecycle engine of a marketplace connecting clients with
//! movers.
//!
//! The engine owns the rules that carry real invariants:
//!
//! - **Estimate lifecycle**: a client's [`MoveRequest`] collects [`Estimate`]s
//!   from movers; the client confirms the one they accept.
//! - **Reviews**: a confirmed estimate accepts exactly one [`Review`]. Rating
//!   and content are checked against domain rules, and duplicates are refused.
//! - **Favorites**: a toggled (client, mover) relationship whose row count is
//!   always equal to the mover's `favoriteCount`.
//! - **Listings**: paginated, searchable, sortable views of movers and
//!   reviews, annotated with viewer-scoped flags.
//!
//! ## Design Principles
//!
//! - **No IO**: callers pass identities and timestamps in; nothing reads a clock
//! - **Derived counters**: mover aggregates are recomputed from rows after
//!   every mutation, never adjusted in place
//! - **Typed boundaries**: ids, sort keys, and page parameters are parsed into
//!   closed types before any domain logic runs
//!
//! ## Quick Start
//!
//! ```rust
//! use mover_engine::{ClientId, ClientProfile, MoverId, MoverProfile, Store};
//!
//! let mut store = Store::new();
//! let client = ClientId::new();
//! let mover = MoverId::new();
//!
//! store
//!     .upsert_client(
//!         client,
//!         ClientProfile { name: "Kim".into(), email: "kim@example.com".into(), phone: None },
//!         1_706_745_600_000,
//!     )
//!     .unwrap();
//! store
//!     .upsert_mover(
//!         mover,
//!         MoverProfile {
//!             nickname: "Swift Haulers".into(),
//!             introduction: String::new(),
//!             description: String::new(),
//!             career: 5,
//!             service_types: vec![],
//!             service_regions: vec![],
//!         },
//!         1_706_745_600_000,
//!     )
//!     .unwrap();
//!
//! let outcome = store.toggle_favorite(client, mover, 1_706_745_601_000).unwrap();
//! assert!(outcome.is_favorite);
//! assert_eq!(outcome.favorite_count, 1);
//! ```
//!
//! ## Persistence
//!
//! [`Store`] is an in-memory record store. Use [`Store::export_state`] and
//! [`Store::from_snapshot`] with [`StoreSnapshot`] to move its rows in and out.

pub mod aggregate;
pub mod error;
pub mod estimate;
pub mod favorite;
pub mod id;
pub mod identity;
pub mod listing;
pub mod model;
pub mod pagination;
pub mod review;
pub mod snapshot;
pub mod store;
pub mod view;

// Re-export main types at crate root
pub use aggregate::MoverAggregates;
pub use error::{Error, ErrorKind};
pub use id::{ClientId, EstimateId, MoverId, RequestId, ReviewId};
pub use identity::{require_client, require_mover, viewer, Identity, Role};
pub use listing::{MoverQuery, MoverSearchParams, SortBy};
pub use model::{
    validate_price, Client, ClientProfile, Estimate, Favorite, MoveRequest, MoveType, Mover,
    MoverProfile, NewMoveRequest, Review, MAX_CAREER_YEARS, MAX_PRICE, MAX_TIMESTAMP,
};
pub use pagination::{PageParams, PageRequest, Pagination};
pub use review::{EstimateState, ReviewDraft, ReviewInput};
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::Store;
pub use view::{
    DeletedReview, EstimatePage, FavoriteMoverView, FavoritePage, MoverPage, MoverView,
    ReviewPage, ReviewView, ToggleAction, ToggleOutcome, WritableEstimateView,
};

pub use error::Result;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
