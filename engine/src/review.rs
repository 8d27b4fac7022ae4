//! Review engine.
//!
//! Each estimate moves through `Unconfirmed -> ConfirmedUnreviewed -> Reviewed`.
//! Only `ConfirmedUnreviewed` accepts a new review, deleting the review moves
//! the estimate back there, and the store's unique index on the estimate id
//! guarantees at most one review per estimate.

use crate::{
    error::Result,
    pagination::{PageParams, PageRequest, REVIEWS_DEFAULT_LIMIT},
    ClientId, DeletedReview, Error, Estimate, EstimateId, EstimatePage, MoverId, Review,
    ReviewId, ReviewPage, ReviewView, Store, Timestamp, WritableEstimateView,
};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating.
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i64 = 5;

/// Minimum review length in characters, after trimming.
pub const MIN_CONTENT_CHARS: usize = 10;

/// Review state of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstimateState {
    Unconfirmed,
    ConfirmedUnreviewed,
    Reviewed,
}

impl EstimateState {
    pub fn of(estimate: &Estimate, reviewed: bool) -> Self {
        match (estimate.is_client_confirmed, reviewed) {
            (_, true) => EstimateState::Reviewed,
            (true, false) => EstimateState::ConfirmedUnreviewed,
            (false, false) => EstimateState::Unconfirmed,
        }
    }

    /// Whether a review may be created in this state.
    pub fn is_writable(&self) -> bool {
        matches!(self, EstimateState::ConfirmedUnreviewed)
    }
}

/// Rating and content as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub rating: i64,
    pub content: String,
}

/// Rating and content that passed the domain rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: u8,
    pub content: String,
}

impl ReviewInput {
    pub fn new(rating: i64, content: impl Into<String>) -> Self {
        Self {
            rating,
            content: content.into(),
        }
    }

    /// Apply the rating range and content length rules.
    pub fn validate(&self) -> Result<ReviewDraft> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::RatingOutOfRange(self.rating));
        }
        let content = self.content.trim();
        let actual = content.chars().count();
        if actual < MIN_CONTENT_CHARS {
            return Err(Error::ContentTooShort {
                min: MIN_CONTENT_CHARS,
                actual,
            });
        }
        Ok(ReviewDraft {
            // Range checked above.
            rating: self.rating as u8,
            content: content.to_string(),
        })
    }
}

impl Store {
    /// Review state of an estimate.
    pub fn estimate_state(&self, id: EstimateId) -> Option<EstimateState> {
        let estimate = self.estimate(id)?;
        Some(EstimateState::of(
            estimate,
            self.review_for_estimate(id).is_some(),
        ))
    }

    /// Write the client's review of a confirmed estimate.
    ///
    /// Checks run in order: the estimate resolves, the caller owns it, the
    /// rating and content are acceptable, the estimate is confirmed, and it
    /// has no review yet.
    pub fn create_review(
        &mut self,
        client: ClientId,
        estimate_id: EstimateId,
        input: &ReviewInput,
        now: Timestamp,
    ) -> Result<Review> {
        let estimate = self
            .estimate(estimate_id)
            .ok_or(Error::UnknownEstimate(estimate_id))?;
        if estimate.client_id != client {
            return Err(Error::NotOwner {
                resource: "estimate",
                id: estimate_id.to_string(),
            });
        }
        let draft = input.validate()?;

        match EstimateState::of(estimate, self.review_for_estimate(estimate_id).is_some()) {
            EstimateState::Unconfirmed => return Err(Error::EstimateNotConfirmed(estimate_id)),
            EstimateState::Reviewed => return Err(Error::ReviewAlreadyExists(estimate_id)),
            EstimateState::ConfirmedUnreviewed => {}
        }

        let review = Review {
            id: ReviewId::new(),
            estimate_id,
            mover_id: estimate.mover_id,
            client_id: client,
            rating: draft.rating,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        self.insert_review(review.clone())?;
        self.refresh_aggregates(review.mover_id);
        Ok(review)
    }

    /// Replace the rating and content of the client's own review.
    pub fn update_review(
        &mut self,
        client: ClientId,
        id: ReviewId,
        input: &ReviewInput,
        now: Timestamp,
    ) -> Result<Review> {
        self.owned_review(client, id)?;
        let draft = input.validate()?;

        let review = self.review_mut(id).ok_or(Error::ReviewNotFound(id))?;
        review.rating = draft.rating;
        review.content = draft.content;
        review.updated_at = now;
        let review = review.clone();

        self.refresh_aggregates(review.mover_id);
        Ok(review)
    }

    /// Delete the client's own review, reopening its estimate for review.
    pub fn delete_review(&mut self, client: ClientId, id: ReviewId) -> Result<DeletedReview> {
        self.owned_review(client, id)?;
        let review = self.remove_review(id).ok_or(Error::ReviewNotFound(id))?;
        self.refresh_aggregates(review.mover_id);
        Ok(DeletedReview {
            deleted: true,
            review_id: id,
        })
    }

    /// Reviews written by a client, newest first.
    pub fn list_my_reviews(&self, client: ClientId, params: &PageParams) -> ReviewPage {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let reviews: Vec<&Review> = self.reviews().filter(|r| r.client_id == client).collect();
        self.review_page(reviews, page, |store, review| ReviewView {
            mover_nickname: store.mover(review.mover_id).map(|m| m.nickname.clone()),
            client_name: None,
            review: review.clone(),
        })
    }

    /// Reviews of a mover, newest first. An unknown mover yields an empty page.
    pub fn list_mover_reviews(&self, mover: MoverId, params: &PageParams) -> ReviewPage {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let reviews: Vec<&Review> = self.reviews().filter(|r| r.mover_id == mover).collect();
        self.review_page(reviews, page, |store, review| ReviewView {
            mover_nickname: None,
            client_name: store.client(review.client_id).map(|c| c.name.clone()),
            review: review.clone(),
        })
    }

    /// Confirmed estimates of a client that have no review yet, newest first.
    pub fn list_writable_estimates(&self, client: ClientId, params: &PageParams) -> EstimatePage {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let mut writable: Vec<&Estimate> = self
            .estimates()
            .filter(|e| e.client_id == client)
            .filter(|e| {
                EstimateState::of(e, self.review_for_estimate(e.id).is_some()).is_writable()
            })
            .collect();
        writable.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        // Joined before paging so the total counts exactly the rows that can be returned.
        let joined: Vec<WritableEstimateView> = writable
            .into_iter()
            .filter_map(|estimate| {
                let request = self.request(estimate.request_id)?;
                let mover = self.mover(estimate.mover_id)?;
                Some(WritableEstimateView {
                    estimate: estimate.clone(),
                    move_type: request.move_type,
                    move_date: request.move_date,
                    departure: request.departure.clone(),
                    arrival: request.arrival.clone(),
                    mover_nickname: mover.nickname.clone(),
                })
            })
            .collect();

        let total = joined.len() as u64;
        let estimates = page.slice(joined);

        EstimatePage {
            estimates,
            total,
            pagination: page.pagination(total),
        }
    }

    /// Resolve a review and check that `client` wrote it. NotFound wins over Forbidden.
    fn owned_review(&self, client: ClientId, id: ReviewId) -> Result<&Review> {
        let review = self.review(id).ok_or(Error::ReviewNotFound(id))?;
        if review.client_id != client {
            return Err(Error::NotOwner {
                resource: "review",
                id: id.to_string(),
            });
        }
        Ok(review)
    }

    fn review_page(
        &self,
        mut reviews: Vec<&Review>,
        page: PageRequest,
        view: impl Fn(&Store, &Review) -> ReviewView,
    ) -> ReviewPage {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = reviews.len() as u64;
        let reviews = page
            .slice(reviews)
            .into_iter()
            .map(|review| view(self, review))
            .collect();
        ReviewPage {
            reviews,
            total,
            pagination: page.pagination(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use crate::ErrorKind;

    const GOOD: &str = "They wrapped every plate and arrived early.";

    #[test]
    fn rating_bounds() {
        for rating in [0, 6, -1] {
            let err = ReviewInput::new(rating, GOOD).validate().unwrap_err();
            assert_eq!(err, Error::RatingOutOfRange(rating));
        }
        for rating in 1..=5 {
            assert!(ReviewInput::new(rating, GOOD).validate().is_ok());
        }
    }

    #[test]
    fn content_threshold_counts_characters() {
        let err = ReviewInput::new(5, "ok").validate().unwrap_err();
        assert_eq!(err, Error::ContentTooShort { min: 10, actual: 2 });

        let err = ReviewInput::new(5, "   short    ").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainConflict);

        // Ten multi-byte characters pass.
        assert!(ReviewInput::new(5, "친절하고빠른이사였어요").validate().is_ok());
    }

    #[test]
    fn state_machine() {
        let mut fx = Fixture::new();
        let estimate = fx.estimate();
        assert_eq!(
            fx.store.estimate_state(estimate),
            Some(EstimateState::Unconfirmed)
        );

        fx.store.confirm_estimate(fx.client, estimate, 2).unwrap();
        assert_eq!(
            fx.store.estimate_state(estimate),
            Some(EstimateState::ConfirmedUnreviewed)
        );

        let review = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(4, GOOD), 3)
            .unwrap();
        assert_eq!(
            fx.store.estimate_state(estimate),
            Some(EstimateState::Reviewed)
        );

        fx.store.delete_review(fx.client, review.id).unwrap();
        assert_eq!(
            fx.store.estimate_state(estimate),
            Some(EstimateState::ConfirmedUnreviewed)
        );
    }

    #[test]
    fn unconfirmed_estimate_is_not_writable() {
        let mut fx = Fixture::new();
        let estimate = fx.estimate();
        let err = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(5, GOOD), 3)
            .unwrap_err();
        assert_eq!(err, Error::EstimateNotConfirmed(estimate));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn unknown_estimate_is_validation_error() {
        let mut fx = Fixture::new();
        let missing = EstimateId::new();
        let err = fx
            .store
            .create_review(fx.client, missing, &ReviewInput::new(5, GOOD), 3)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn rating_checked_before_duplicate() {
        let mut fx = Fixture::new();
        let estimate = fx.confirmed_estimate();
        fx.store
            .create_review(fx.client, estimate, &ReviewInput::new(5, GOOD), 3)
            .unwrap();

        let err = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(9, GOOD), 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainConflict);

        let err = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(3, GOOD), 4)
            .unwrap_err();
        assert_eq!(err, Error::ReviewAlreadyExists(estimate));
        assert_eq!(fx.store.reviews().count(), 1);
    }

    #[test]
    fn aggregates_follow_create_update_delete() {
        let mut fx = Fixture::new();
        let first = fx.confirmed_estimate();
        let second = fx.confirmed_estimate();

        let a = fx
            .store
            .create_review(fx.client, first, &ReviewInput::new(5, GOOD), 3)
            .unwrap();
        fx.store
            .create_review(fx.client, second, &ReviewInput::new(2, GOOD), 4)
            .unwrap();
        let stats = fx.store.mover(fx.mover).unwrap().aggregates;
        assert_eq!(stats.review_count, 2);
        assert_eq!(stats.average_review_rating, 3.5);

        fx.store
            .update_review(fx.client, a.id, &ReviewInput::new(4, GOOD), 5)
            .unwrap();
        let stats = fx.store.mover(fx.mover).unwrap().aggregates;
        assert_eq!(stats.average_review_rating, 3.0);

        fx.store.delete_review(fx.client, a.id).unwrap();
        let stats = fx.store.mover(fx.mover).unwrap().aggregates;
        assert_eq!(stats.review_count, 1);
        assert_eq!(stats.average_review_rating, 2.0);
    }

    #[test]
    fn last_review_deleted_resets_average() {
        let mut fx = Fixture::new();
        let estimate = fx.confirmed_estimate();
        let review = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(5, GOOD), 3)
            .unwrap();
        fx.store.delete_review(fx.client, review.id).unwrap();

        let stats = fx.store.mover(fx.mover).unwrap().aggregates;
        assert_eq!(stats.review_count, 0);
        assert_eq!(stats.average_review_rating, 0.0);
    }

    #[test]
    fn update_checks_existence_then_owner_then_rating() {
        let mut fx = Fixture::new();
        let estimate = fx.confirmed_estimate();
        let review = fx
            .store
            .create_review(fx.client, estimate, &ReviewInput::new(5, GOOD), 3)
            .unwrap();

        let err = fx
            .store
            .update_review(fx.client, ReviewId::new(), &ReviewInput::new(0, ""), 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stranger = fx.other_client("Choi");
        let err = fx
            .store
            .update_review(stranger, review.id, &ReviewInput::new(0, ""), 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = fx
            .store
            .update_review(fx.client, review.id, &ReviewInput::new(0, GOOD), 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainConflict);
        assert_eq!(fx.store.review(review.id).unwrap().rating, 5);
    }

    #[test]
    fn writable_list_excludes_reviewed_and_unconfirmed() {
        let mut fx = Fixture::new();
        let _pending = fx.estimate();
        let open = fx.confirmed_estimate();
        let done = fx.confirmed_estimate();
        fx.store
            .create_review(fx.client, done, &ReviewInput::new(5, GOOD), 9)
            .unwrap();

        let page = fx
            .store
            .list_writable_estimates(fx.client, &PageParams::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.estimates[0].estimate.id, open);
        assert_eq!(page.estimates[0].mover_nickname, "Swift Haulers");
    }

    #[test]
    fn writable_total_matches_joined_rows() {
        let mut fx = Fixture::new();
        let open = fx.confirmed_estimate();
        let template = fx.store.estimate(open).unwrap().clone();
        let orphan = Estimate {
            id: EstimateId::new(),
            mover_id: MoverId::new(),
            ..template
        };
        fx.store.insert_estimate(orphan).unwrap();

        let page = fx
            .store
            .list_writable_estimates(fx.client, &PageParams::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.estimates.len(), 1);
        assert_eq!(page.estimates[0].estimate.id, open);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn mover_reviews_for_unknown_mover_is_empty() {
        let fx = Fixture::new();
        let page = fx
            .store
            .list_mover_reviews(MoverId::new(), &PageParams::default());
        assert_eq!(page.total, 0);
        assert!(page.reviews.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn review_listings_join_names() {
        let mut fx = Fixture::new();
        let estimate = fx.confirmed_estimate();
        fx.store
            .create_review(fx.client, estimate, &ReviewInput::new(5, GOOD), 3)
            .unwrap();

        let mine = fx.store.list_my_reviews(fx.client, &PageParams::default());
        assert_eq!(mine.reviews[0].mover_nickname.as_deref(), Some("Swift Haulers"));

        let theirs = fx
            .store
            .list_mover_reviews(fx.mover, &PageParams::default());
        assert_eq!(theirs.reviews[0].client_name.as_deref(), Some("Kim"));
    }
}
