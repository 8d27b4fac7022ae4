//! Derived mover counters.
//!
//! Every aggregate is a pure function of the underlying rows. Mutating
//! operations never adjust a counter incrementally; they call
//! [`MoverAggregates::derive`] for each affected mover after the row change.

use crate::{Estimate, Favorite, MoverId, Review};
use serde::{Deserialize, Serialize};

/// Counters maintained on every mover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoverAggregates {
    pub review_count: u64,
    /// Mean rating over all reviews, `0.0` when there are none
    pub average_review_rating: f64,
    pub estimate_count: u64,
    pub favorite_count: u64,
}

impl MoverAggregates {
    /// Recompute all counters for `mover` from the given rows.
    ///
    /// Rows belonging to other movers are ignored, so callers may pass whole tables.
    pub fn derive<'a>(
        mover: MoverId,
        estimates: impl IntoIterator<Item = &'a Estimate>,
        reviews: impl IntoIterator<Item = &'a Review>,
        favorites: impl IntoIterator<Item = &'a Favorite>,
    ) -> Self {
        let estimate_count = estimates
            .into_iter()
            .filter(|e| e.mover_id == mover)
            .count() as u64;
        let ratings = reviews
            .into_iter()
            .filter(|r| r.mover_id == mover)
            .map(|r| r.rating);
        let (review_count, average_review_rating) = mean_rating(ratings);
        let favorite_count = favorites
            .into_iter()
            .filter(|f| f.mover_id == mover)
            .count() as u64;

        Self {
            review_count,
            average_review_rating,
            estimate_count,
            favorite_count,
        }
    }
}

/// Count and mean of a set of ratings.
pub fn mean_rating(ratings: impl IntoIterator<Item = u8>) -> (u64, f64) {
    let (count, sum) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(count, sum), r| (count + 1, sum + u64::from(r)));
    if count == 0 {
        (0, 0.0)
    } else {
        (count, sum as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientId, EstimateId, ReviewId};

    fn review(mover: MoverId, rating: u8) -> Review {
        Review {
            id: ReviewId::new(),
            estimate_id: EstimateId::new(),
            mover_id: mover,
            client_id: ClientId::new(),
            rating,
            content: "Careful and on time.".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean_rating(std::iter::empty()), (0, 0.0));
    }

    #[test]
    fn mean_of_ratings() {
        assert_eq!(mean_rating([5, 4, 3]), (3, 4.0));
        assert_eq!(mean_rating([5, 4]), (2, 4.5));
    }

    #[test]
    fn derive_ignores_other_movers() {
        let mover = MoverId::new();
        let other = MoverId::new();
        let reviews = vec![review(mover, 5), review(other, 1), review(mover, 3)];
        let favorites = vec![
            Favorite {
                client_id: ClientId::new(),
                mover_id: other,
                created_at: 0,
            },
            Favorite {
                client_id: ClientId::new(),
                mover_id: mover,
                created_at: 0,
            },
        ];

        let estimates: Vec<Estimate> = Vec::new();
        let aggregates = MoverAggregates::derive(mover, &estimates, &reviews, &favorites);
        assert_eq!(aggregates.review_count, 2);
        assert_eq!(aggregates.average_review_rating, 4.0);
        assert_eq!(aggregates.estimate_count, 0);
        assert_eq!(aggregates.favorite_count, 1);
    }
}
