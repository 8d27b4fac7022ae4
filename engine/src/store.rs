//! Store - the in-memory record store.
//!
//! The Store owns every row and enforces the storage-level constraints:
//! one review per estimate, one favorite per (client, mover) pair, and one
//! estimate per (request, mover) pair. Each public operation takes `&mut self`
//! for its whole unit of work and validates before it mutates, so no caller
//! can observe a row change without the matching aggregate refresh.

use crate::{
    aggregate::MoverAggregates, error::Result, Client, ClientId, ClientProfile, Error, Estimate,
    EstimateId, Favorite, MoveRequest, Mover, MoverId, MoverProfile, RequestId, Review,
    ReviewId, Timestamp,
};
use std::collections::HashMap;

/// The record store holding all marketplace state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    clients: HashMap<ClientId, Client>,
    movers: HashMap<MoverId, Mover>,
    requests: HashMap<RequestId, MoveRequest>,
    estimates: HashMap<EstimateId, Estimate>,
    reviews: HashMap<ReviewId, Review>,
    favorites: HashMap<(ClientId, MoverId), Favorite>,
    // Unique indexes
    review_by_estimate: HashMap<EstimateId, ReviewId>,
    estimate_by_bid: HashMap<(RequestId, MoverId), EstimateId>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the profile of a client.
    pub fn upsert_client(
        &mut self,
        id: ClientId,
        profile: ClientProfile,
        now: Timestamp,
    ) -> Result<Client> {
        profile.validate()?;
        let created_at = self.clients.get(&id).map_or(now, |c| c.created_at);
        let client = Client {
            id,
            name: profile.name.trim().to_string(),
            email: profile.email.trim().to_string(),
            phone: profile.phone,
            created_at,
        };
        self.clients.insert(id, client.clone());
        Ok(client)
    }

    /// Create or update the profile of a mover. Aggregates are left untouched.
    pub fn upsert_mover(
        &mut self,
        id: MoverId,
        profile: MoverProfile,
        now: Timestamp,
    ) -> Result<Mover> {
        profile.validate()?;
        let (aggregates, created_at) = match self.movers.get(&id) {
            Some(existing) => (existing.aggregates, existing.created_at),
            None => (MoverAggregates::default(), now),
        };
        let mover = Mover {
            id,
            nickname: profile.nickname.trim().to_string(),
            introduction: profile.introduction,
            description: profile.description,
            career: profile.career,
            service_types: profile.service_types,
            service_regions: profile.service_regions,
            aggregates,
            created_at,
        };
        self.movers.insert(id, mover.clone());
        Ok(mover)
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn mover(&self, id: MoverId) -> Option<&Mover> {
        self.movers.get(&id)
    }

    pub fn request(&self, id: RequestId) -> Option<&MoveRequest> {
        self.requests.get(&id)
    }

    pub fn estimate(&self, id: EstimateId) -> Option<&Estimate> {
        self.estimates.get(&id)
    }

    pub fn review(&self, id: ReviewId) -> Option<&Review> {
        self.reviews.get(&id)
    }

    /// The review attached to an estimate, if any.
    pub fn review_for_estimate(&self, estimate: EstimateId) -> Option<&Review> {
        self.review_by_estimate
            .get(&estimate)
            .and_then(|id| self.reviews.get(id))
    }

    pub fn is_favorite(&self, client: ClientId, mover: MoverId) -> bool {
        self.favorites.contains_key(&(client, mover))
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn movers(&self) -> impl Iterator<Item = &Mover> {
        self.movers.values()
    }

    pub fn requests(&self) -> impl Iterator<Item = &MoveRequest> {
        self.requests.values()
    }

    pub fn estimates(&self) -> impl Iterator<Item = &Estimate> {
        self.estimates.values()
    }

    pub fn reviews(&self) -> impl Iterator<Item = &Review> {
        self.reviews.values()
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Favorite> {
        self.favorites.values()
    }

    /// Recompute every aggregate of a mover from the underlying rows.
    ///
    /// Every mutating operation ends with this call for each mover it touched.
    pub(crate) fn refresh_aggregates(&mut self, mover: MoverId) -> MoverAggregates {
        let aggregates = MoverAggregates::derive(
            mover,
            self.estimates.values(),
            self.reviews.values(),
            self.favorites.values(),
        );
        if let Some(row) = self.movers.get_mut(&mover) {
            row.aggregates = aggregates;
        }
        aggregates
    }

    pub(crate) fn insert_request(&mut self, request: MoveRequest) {
        self.requests.insert(request.id, request);
    }

    /// Insert an estimate, enforcing one estimate per (request, mover).
    pub(crate) fn insert_estimate(&mut self, estimate: Estimate) -> Result<()> {
        let bid = (estimate.request_id, estimate.mover_id);
        if self.estimate_by_bid.contains_key(&bid) {
            return Err(Error::EstimateAlreadySubmitted {
                request: estimate.request_id,
                mover: estimate.mover_id,
            });
        }
        self.estimate_by_bid.insert(bid, estimate.id);
        self.estimates.insert(estimate.id, estimate);
        Ok(())
    }

    pub(crate) fn estimate_mut(&mut self, id: EstimateId) -> Option<&mut Estimate> {
        self.estimates.get_mut(&id)
    }

    /// Insert a review, enforcing one review per estimate.
    pub(crate) fn insert_review(&mut self, review: Review) -> Result<()> {
        if self.review_by_estimate.contains_key(&review.estimate_id) {
            return Err(Error::ReviewAlreadyExists(review.estimate_id));
        }
        self.review_by_estimate.insert(review.estimate_id, review.id);
        self.reviews.insert(review.id, review);
        Ok(())
    }

    pub(crate) fn review_mut(&mut self, id: ReviewId) -> Option<&mut Review> {
        self.reviews.get_mut(&id)
    }

    pub(crate) fn remove_review(&mut self, id: ReviewId) -> Option<Review> {
        let review = self.reviews.remove(&id)?;
        self.review_by_estimate.remove(&review.estimate_id);
        Some(review)
    }

    /// Insert a favorite, enforcing one row per (client, mover).
    ///
    /// Returns false when the pair already exists.
    pub(crate) fn insert_favorite(&mut self, favorite: Favorite) -> bool {
        let key = (favorite.client_id, favorite.mover_id);
        if self.favorites.contains_key(&key) {
            return false;
        }
        self.favorites.insert(key, favorite);
        true
    }

    pub(crate) fn remove_favorite(&mut self, client: ClientId, mover: MoverId) -> bool {
        self.favorites.remove(&(client, mover)).is_some()
    }

    /// Restore a mover row verbatim. Aggregates are recomputed by the caller.
    pub(crate) fn restore_mover(&mut self, mover: Mover) {
        self.movers.insert(mover.id, mover);
    }

    pub(crate) fn restore_client(&mut self, client: Client) {
        self.clients.insert(client.id, client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_profile, mover_profile};

    #[test]
    fn upsert_mover_keeps_aggregates() {
        let mut store = Store::new();
        let mover = MoverId::new();
        let client = ClientId::new();
        store.upsert_mover(mover, mover_profile("First"), 10).unwrap();
        store.upsert_client(client, client_profile("Lee"), 10).unwrap();
        store.toggle_favorite(client, mover, 20).unwrap();

        let updated = store.upsert_mover(mover, mover_profile("Renamed"), 30).unwrap();
        assert_eq!(updated.nickname, "Renamed");
        assert_eq!(updated.created_at, 10);
        assert_eq!(updated.aggregates.favorite_count, 1);
    }

    #[test]
    fn upsert_client_rejects_blank_name() {
        let mut store = Store::new();
        let err = store
            .upsert_client(ClientId::new(), client_profile(" "), 1)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn favorite_pair_is_unique() {
        let mut store = Store::new();
        let favorite = Favorite {
            client_id: ClientId::new(),
            mover_id: MoverId::new(),
            created_at: 1,
        };
        assert!(store.insert_favorite(favorite.clone()));
        assert!(!store.insert_favorite(favorite));
        assert_eq!(store.favorites().count(), 1);
    }
}
