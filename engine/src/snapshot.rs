//! Snapshot types for seeding and exporting store state.
//!
//! Snapshots use BTreeMap for deterministic serialization order. Importing a
//! snapshot replays rows through the store's unique indexes and recomputes
//! every mover aggregate, so counters stored in the file are never trusted.

use crate::{
    error::Result, Client, ClientId, Error, Estimate, EstimateId, Favorite, MoveRequest, Mover,
    MoverId, RequestId, Review, ReviewId, ReviewInput, Store,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of every row in a [`Store`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    #[serde(default)]
    pub clients: BTreeMap<ClientId, Client>,
    #[serde(default)]
    pub movers: BTreeMap<MoverId, Mover>,
    #[serde(default)]
    pub requests: BTreeMap<RequestId, MoveRequest>,
    #[serde(default)]
    pub estimates: BTreeMap<EstimateId, Estimate>,
    #[serde(default)]
    pub reviews: BTreeMap<ReviewId, Review>,
    /// Sorted by (client, mover)
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

impl StoreSnapshot {
    /// Create a new empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            ..Default::default()
        }
    }

    /// Count rows across all tables.
    pub fn row_count(&self) -> usize {
        self.clients.len()
            + self.movers.len()
            + self.requests.len()
            + self.estimates.len()
            + self.reviews.len()
            + self.favorites.len()
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

impl Store {
    /// Export every row as a snapshot.
    pub fn export_state(&self) -> StoreSnapshot {
        let mut favorites: Vec<Favorite> = self.favorites().cloned().collect();
        favorites.sort_by_key(|f| (f.client_id, f.mover_id));

        StoreSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            clients: self.clients().map(|c| (c.id, c.clone())).collect(),
            movers: self.movers().map(|m| (m.id, m.clone())).collect(),
            requests: self.requests().map(|r| (r.id, r.clone())).collect(),
            estimates: self.estimates().map(|e| (e.id, e.clone())).collect(),
            reviews: self.reviews().map(|r| (r.id, r.clone())).collect(),
            favorites,
        }
    }

    /// Build a store from a snapshot.
    ///
    /// Rejects snapshots whose rows reference missing entities or break a
    /// uniqueness constraint.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut store = Store::new();

        for (id, client) in snapshot.clients {
            ensure_key("client", id, client.id)?;
            store.restore_client(client);
        }
        for (id, mover) in snapshot.movers {
            ensure_key("mover", id, mover.id)?;
            store.restore_mover(mover);
        }
        for (id, request) in snapshot.requests {
            ensure_key("request", id, request.id)?;
            if store.client(request.client_id).is_none() {
                return Err(dangling("request", id, "client", request.client_id));
            }
            store.insert_request(request);
        }
        for (id, estimate) in snapshot.estimates {
            ensure_key("estimate", id, estimate.id)?;
            let request = store
                .request(estimate.request_id)
                .ok_or_else(|| dangling("estimate", id, "request", estimate.request_id))?;
            if request.client_id != estimate.client_id {
                return Err(Error::InvalidSnapshot(format!(
                    "estimate {id} names a client that does not own its request"
                )));
            }
            if store.mover(estimate.mover_id).is_none() {
                return Err(dangling("estimate", id, "mover", estimate.mover_id));
            }
            store
                .insert_estimate(estimate)
                .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        }
        for (id, review) in snapshot.reviews {
            ensure_key("review", id, review.id)?;
            let estimate = store
                .estimate(review.estimate_id)
                .ok_or_else(|| dangling("review", id, "estimate", review.estimate_id))?;
            if estimate.mover_id != review.mover_id || estimate.client_id != review.client_id {
                return Err(Error::InvalidSnapshot(format!(
                    "review {id} disagrees with estimate {} on its parties",
                    review.estimate_id
                )));
            }
            if !estimate.is_client_confirmed {
                return Err(Error::InvalidSnapshot(format!(
                    "review {id} targets unconfirmed estimate {}",
                    review.estimate_id
                )));
            }
            ReviewInput::new(i64::from(review.rating), review.content.as_str())
                .validate()
                .map_err(|e| Error::InvalidSnapshot(format!("review {id}: {e}")))?;
            store
                .insert_review(review)
                .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        }
        for favorite in snapshot.favorites {
            if store.client(favorite.client_id).is_none() || store.mover(favorite.mover_id).is_none()
            {
                return Err(Error::InvalidSnapshot(format!(
                    "favorite ({}, {}) references a missing row",
                    favorite.client_id, favorite.mover_id
                )));
            }
            let (client, mover) = (favorite.client_id, favorite.mover_id);
            if !store.insert_favorite(favorite) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate favorite ({client}, {mover})"
                )));
            }
        }

        let movers: Vec<MoverId> = store.movers().map(|m| m.id).collect();
        for mover in movers {
            store.refresh_aggregates(mover);
        }

        Ok(store)
    }
}

fn ensure_key<T: PartialEq + std::fmt::Display>(kind: &str, key: T, id: T) -> Result<()> {
    if key == id {
        Ok(())
    } else {
        Err(Error::InvalidSnapshot(format!(
            "{kind} stored under key {key} has id {id}"
        )))
    }
}

fn dangling(
    kind: &str,
    id: impl std::fmt::Display,
    target: &str,
    target_id: impl std::fmt::Display,
) -> Error {
    Error::InvalidSnapshot(format!("{kind} {id} references missing {target} {target_id}"))
}
