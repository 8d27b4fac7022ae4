//! PostgreSQL record store backend.
//!
//! Each mutation is one transaction: lock the affected mover row, check the
//! domain rules, change rows, refresh the mover's aggregates, commit. The
//! unique constraints on reviews, estimates and favorites back the
//! application-level checks under concurrent writers.

use mover_engine::{
    pagination::{FAVORITES_DEFAULT_LIMIT, REVIEWS_DEFAULT_LIMIT},
    Client, ClientId, ClientProfile, DeletedReview, Error, Estimate, EstimateId, EstimatePage,
    EstimateState, FavoritePage, MoveRequest, Mover, MoverId, MoverPage, MoverProfile,
    MoverQuery, MoverView, NewMoveRequest, PageParams, PageRequest, RequestId, Review,
    ReviewId, ReviewInput, ReviewPage, Timestamp, ToggleAction, ToggleOutcome,
};
use sqlx::PgPool;

use crate::db;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn upsert_client(
        &self,
        id: ClientId,
        profile: &ClientProfile,
        now: Timestamp,
    ) -> Result<Client> {
        profile.validate()?;
        Ok(db::upsert_client(&self.pool, id, profile, now).await?)
    }

    pub async fn upsert_mover(
        &self,
        id: MoverId,
        profile: &MoverProfile,
        now: Timestamp,
    ) -> Result<Mover> {
        profile.validate()?;
        Ok(db::upsert_mover(&self.pool, id, profile, now).await?)
    }

    pub async fn create_request(
        &self,
        client: ClientId,
        input: NewMoveRequest,
        now: Timestamp,
    ) -> Result<MoveRequest> {
        if !db::client_exists(&self.pool, client).await? {
            return Err(Error::ClientNotFound(client).into());
        }
        input.validate()?;

        let request = MoveRequest {
            id: RequestId::new(),
            client_id: client,
            move_type: input.move_type,
            move_date: input.move_date,
            departure: input.departure.trim().to_string(),
            arrival: input.arrival.trim().to_string(),
            created_at: now,
        };
        db::insert_request(&self.pool, &request)
            .await
            .map_err(|e| {
                if db::is_foreign_key_violation(&e) {
                    Error::ClientNotFound(client).into()
                } else {
                    AppError::from(e)
                }
            })?;
        Ok(request)
    }

    pub async fn create_estimate(
        &self,
        mover: MoverId,
        client: ClientId,
        request: RequestId,
        price: u64,
        comment: &str,
        now: Timestamp,
    ) -> Result<Estimate> {
        let mut tx = self.pool.begin().await?;

        if !db::lock_mover(&mut *tx, mover).await? {
            return Err(Error::MoverNotFound(mover).into());
        }
        let owner = db::get_request(&mut *tx, request)
            .await?
            .ok_or(Error::RequestNotFound(request))?
            .client_id;
        if owner != client {
            return Err(Error::RequestClientMismatch { request, client }.into());
        }
        mover_engine::validate_price(price)?;

        let estimate = Estimate {
            id: EstimateId::new(),
            request_id: request,
            mover_id: mover,
            client_id: client,
            price,
            comment: comment.trim().to_string(),
            is_client_confirmed: false,
            confirmed_at: None,
            created_at: now,
        };
        db::insert_estimate(&mut *tx, &estimate)
            .await
            .map_err(|e| {
                if db::is_unique_violation(&e, db::ESTIMATES_REQUEST_MOVER_KEY) {
                    Error::EstimateAlreadySubmitted { request, mover }.into()
                } else {
                    AppError::from(e)
                }
            })?;
        db::refresh_aggregates(&mut *tx, mover).await?;
        tx.commit().await?;

        Ok(estimate)
    }

    pub async fn confirm_estimate(
        &self,
        client: ClientId,
        id: EstimateId,
        now: Timestamp,
    ) -> Result<Estimate> {
        let mut tx = self.pool.begin().await?;

        let estimate = db::lock_estimate(&mut *tx, id)
            .await?
            .ok_or(Error::EstimateNotFound(id))?;
        if estimate.client_id != client {
            return Err(Error::NotOwner {
                resource: "estimate",
                id: id.to_string(),
            }
            .into());
        }
        if estimate.is_client_confirmed {
            return Ok(estimate);
        }

        let estimate = db::confirm_estimate(&mut *tx, id, now)
            .await?
            .ok_or(Error::EstimateNotFound(id))?;
        tx.commit().await?;

        Ok(estimate)
    }

    pub async fn create_review(
        &self,
        client: ClientId,
        estimate_id: EstimateId,
        input: &ReviewInput,
        now: Timestamp,
    ) -> Result<Review> {
        let estimate = db::get_estimate(&self.pool, estimate_id)
            .await?
            .ok_or(Error::UnknownEstimate(estimate_id))?;
        if estimate.client_id != client {
            return Err(Error::NotOwner {
                resource: "estimate",
                id: estimate_id.to_string(),
            }
            .into());
        }
        let draft = input.validate()?;

        let mut tx = self.pool.begin().await?;
        db::lock_mover(&mut *tx, estimate.mover_id).await?;
        // Re-read under lock: a confirmation may have landed since.
        let estimate = db::lock_estimate(&mut *tx, estimate_id)
            .await?
            .ok_or(Error::UnknownEstimate(estimate_id))?;
        let reviewed = db::review_exists_for_estimate(&mut *tx, estimate_id).await?;
        match EstimateState::of(&estimate, reviewed) {
            EstimateState::Unconfirmed => {
                return Err(Error::EstimateNotConfirmed(estimate_id).into())
            }
            EstimateState::Reviewed => return Err(Error::ReviewAlreadyExists(estimate_id).into()),
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
        db::insert_review(&mut *tx, &review).await.map_err(|e| {
            if db::is_unique_violation(&e, db::REVIEWS_ESTIMATE_KEY) {
                Error::ReviewAlreadyExists(estimate_id).into()
            } else {
                AppError::from(e)
            }
        })?;
        db::refresh_aggregates(&mut *tx, review.mover_id).await?;
        tx.commit().await?;

        Ok(review)
    }

    pub async fn update_review(
        &self,
        client: ClientId,
        id: ReviewId,
        input: &ReviewInput,
        now: Timestamp,
    ) -> Result<Review> {
        let existing = self.owned_review(client, id).await?;
        let draft = input.validate()?;

        let mut tx = self.pool.begin().await?;
        db::lock_mover(&mut *tx, existing.mover_id).await?;
        let review = db::update_review(&mut *tx, id, &draft, now)
            .await?
            .ok_or(Error::ReviewNotFound(id))?;
        db::refresh_aggregates(&mut *tx, review.mover_id).await?;
        tx.commit().await?;

        Ok(review)
    }

    pub async fn delete_review(&self, client: ClientId, id: ReviewId) -> Result<DeletedReview> {
        let existing = self.owned_review(client, id).await?;

        let mut tx = self.pool.begin().await?;
        db::lock_mover(&mut *tx, existing.mover_id).await?;
        if !db::delete_review(&mut *tx, id).await? {
            return Err(Error::ReviewNotFound(id).into());
        }
        db::refresh_aggregates(&mut *tx, existing.mover_id).await?;
        tx.commit().await?;

        Ok(DeletedReview {
            deleted: true,
            review_id: id,
        })
    }

    pub async fn list_my_reviews(&self, client: ClientId, params: &PageParams) -> Result<ReviewPage> {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let (reviews, total) = db::list_client_reviews(&self.pool, client, &page).await?;
        Ok(ReviewPage {
            reviews,
            total,
            pagination: page.pagination(total),
        })
    }

    pub async fn list_mover_reviews(
        &self,
        mover: MoverId,
        params: &PageParams,
    ) -> Result<ReviewPage> {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let (reviews, total) = db::list_mover_reviews(&self.pool, mover, &page).await?;
        Ok(ReviewPage {
            reviews,
            total,
            pagination: page.pagination(total),
        })
    }

    pub async fn list_writable_estimates(
        &self,
        client: ClientId,
        params: &PageParams,
    ) -> Result<EstimatePage> {
        let page = PageRequest::lenient(params, REVIEWS_DEFAULT_LIMIT);
        let (estimates, total) = db::list_writable_estimates(&self.pool, client, &page).await?;
        Ok(EstimatePage {
            estimates,
            total,
            pagination: page.pagination(total),
        })
    }

    pub async fn toggle_favorite(
        &self,
        client: ClientId,
        mover: MoverId,
        now: Timestamp,
    ) -> Result<ToggleOutcome> {
        let mut tx = self.pool.begin().await?;

        if !db::lock_mover(&mut *tx, mover).await? {
            return Err(Error::MoverNotFound(mover).into());
        }
        if !db::client_exists(&mut *tx, client).await? {
            return Err(Error::ClientNotFound(client).into());
        }

        let action = if db::delete_favorite(&mut *tx, client, mover).await? {
            ToggleAction::Removed
        } else {
            db::insert_favorite(&mut *tx, client, mover, now).await?;
            ToggleAction::Added
        };
        let aggregates = db::refresh_aggregates(&mut *tx, mover).await?;
        tx.commit().await?;

        Ok(ToggleOutcome {
            action,
            is_favorite: action == ToggleAction::Added,
            favorite_count: aggregates.favorite_count,
        })
    }

    pub async fn list_favorites(&self, client: ClientId, params: &PageParams) -> Result<FavoritePage> {
        let page = PageRequest::lenient(params, FAVORITES_DEFAULT_LIMIT);
        let (movers, total) = db::list_favorites(&self.pool, client, &page).await?;
        Ok(FavoritePage {
            movers,
            total,
            pagination: page.pagination(total),
        })
    }

    pub async fn list_movers(
        &self,
        query: &MoverQuery,
        viewer: Option<ClientId>,
    ) -> Result<MoverPage> {
        let (movers, total) = db::list_movers(&self.pool, query).await?;
        let liked = match viewer {
            Some(client) => {
                let ids: Vec<MoverId> = movers.iter().map(|m| m.id).collect();
                db::favorited_among(&self.pool, client, &ids).await?
            }
            None => Default::default(),
        };

        let movers = movers
            .into_iter()
            .map(|mover| MoverView {
                is_favorite: liked.contains(&mover.id),
                mover,
            })
            .collect();

        Ok(MoverPage {
            movers,
            total,
            page: query.page.page,
            limit: query.page.limit,
            has_more: query.page.has_more(total),
            pagination: query.page.pagination(total),
        })
    }

    pub async fn get_mover(&self, id: MoverId, viewer: Option<ClientId>) -> Result<MoverView> {
        let mover = db::get_mover(&self.pool, id)
            .await?
            .ok_or(Error::MoverNotFound(id))?;
        let is_favorite = match viewer {
            Some(client) => db::is_favorite(&self.pool, client, id).await?,
            None => false,
        };
        Ok(MoverView { mover, is_favorite })
    }

    /// Resolve a review and check that `client` wrote it. NotFound wins over Forbidden.
    async fn owned_review(&self, client: ClientId, id: ReviewId) -> Result<Review> {
        let review = db::get_review(&self.pool, id)
            .await?
            .ok_or(Error::ReviewNotFound(id))?;
        if review.client_id != client {
            return Err(Error::NotOwner {
                resource: "review",
                id: id.to_string(),
            }
            .into());
        }
        Ok(review)
    }
}
