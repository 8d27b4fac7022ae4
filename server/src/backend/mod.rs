//! Record store backends.
//!
//! [`Backend`] runs every marketplace operation against either PostgreSQL or
//! the engine's in-memory [`Store`]. Both enforce the same rules: the
//! in-memory backend calls the engine directly, and the Postgres backend
//! reuses the engine's validation and state checks around its transactions.

mod memory;
mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

use mover_engine::{
    Client, ClientId, ClientProfile, DeletedReview, Estimate, EstimateId, EstimatePage,
    FavoritePage, MoveRequest, Mover, MoverId, MoverPage, MoverProfile, MoverQuery, MoverView,
    NewMoveRequest, PageParams, RequestId, Review, ReviewId, ReviewInput, ReviewPage, Store,
    Timestamp, ToggleOutcome,
};
use sqlx::PgPool;

use crate::error::Result;

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as Timestamp
}

/// The record store shared by all handlers.
#[derive(Clone)]
pub enum Backend {
    Memory(MemoryBackend),
    Postgres(PostgresBackend),
}

impl Backend {
    pub fn memory(store: Store) -> Self {
        Backend::Memory(MemoryBackend::new(store))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Backend::Postgres(PostgresBackend::new(pool))
    }

    /// Name reported by the health check.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }

    pub async fn upsert_client(&self, id: ClientId, profile: ClientProfile) -> Result<Client> {
        let now = now_millis();
        let client = match self {
            Backend::Memory(m) => m.with_store(|s| s.upsert_client(id, profile, now))?,
            Backend::Postgres(p) => p.upsert_client(id, &profile, now).await?,
        };
        tracing::info!(client = %id, "client profile saved");
        Ok(client)
    }

    pub async fn upsert_mover(&self, id: MoverId, profile: MoverProfile) -> Result<Mover> {
        let now = now_millis();
        let mover = match self {
            Backend::Memory(m) => m.with_store(|s| s.upsert_mover(id, profile, now))?,
            Backend::Postgres(p) => p.upsert_mover(id, &profile, now).await?,
        };
        tracing::info!(mover = %id, "mover profile saved");
        Ok(mover)
    }

    pub async fn create_request(
        &self,
        client: ClientId,
        input: NewMoveRequest,
    ) -> Result<MoveRequest> {
        let now = now_millis();
        let request = match self {
            Backend::Memory(m) => m.with_store(|s| s.create_request(client, input, now))?,
            Backend::Postgres(p) => p.create_request(client, input, now).await?,
        };
        tracing::info!(client = %client, request = %request.id, "move request created");
        Ok(request)
    }

    /// Submit a mover's estimate for a request owned by `client`.
    pub async fn create_estimate(
        &self,
        mover: MoverId,
        client: ClientId,
        request: RequestId,
        price: u64,
        comment: &str,
    ) -> Result<Estimate> {
        let now = now_millis();
        let estimate = match self {
            Backend::Memory(m) => m.with_store(|s| {
                s.create_estimate(mover, client, request, price, comment, now)
            })?,
            Backend::Postgres(p) => {
                p.create_estimate(mover, client, request, price, comment, now)
                    .await?
            }
        };
        tracing::info!(
            mover = %mover,
            request = %request,
            estimate = %estimate.id,
            price,
            "estimate submitted"
        );
        Ok(estimate)
    }

    /// Owner of a request, for callers that only know the request id.
    pub async fn request_owner(&self, request: RequestId) -> Result<ClientId> {
        let owner = match self {
            Backend::Memory(m) => m.read(|s| s.request(request).map(|r| r.client_id))?,
            Backend::Postgres(p) => crate::db::get_request(p.pool(), request)
                .await?
                .map(|r| r.client_id),
        };
        Ok(owner.ok_or(mover_engine::Error::RequestNotFound(request))?)
    }

    pub async fn confirm_estimate(&self, client: ClientId, id: EstimateId) -> Result<Estimate> {
        let now = now_millis();
        let estimate = match self {
            Backend::Memory(m) => m.with_store(|s| s.confirm_estimate(client, id, now))?,
            Backend::Postgres(p) => p.confirm_estimate(client, id, now).await?,
        };
        tracing::info!(client = %client, estimate = %id, "estimate confirmed");
        Ok(estimate)
    }

    pub async fn create_review(
        &self,
        client: ClientId,
        estimate: EstimateId,
        input: ReviewInput,
    ) -> Result<Review> {
        let now = now_millis();
        let review = match self {
            Backend::Memory(m) => {
                m.with_store(|s| s.create_review(client, estimate, &input, now))?
            }
            Backend::Postgres(p) => p.create_review(client, estimate, &input, now).await?,
        };
        tracing::info!(
            client = %client,
            estimate = %estimate,
            review = %review.id,
            rating = review.rating,
            "review created"
        );
        Ok(review)
    }

    pub async fn update_review(
        &self,
        client: ClientId,
        id: ReviewId,
        input: ReviewInput,
    ) -> Result<Review> {
        let now = now_millis();
        let review = match self {
            Backend::Memory(m) => m.with_store(|s| s.update_review(client, id, &input, now))?,
            Backend::Postgres(p) => p.update_review(client, id, &input, now).await?,
        };
        tracing::info!(client = %client, review = %id, rating = review.rating, "review updated");
        Ok(review)
    }

    pub async fn delete_review(&self, client: ClientId, id: ReviewId) -> Result<DeletedReview> {
        let deleted = match self {
            Backend::Memory(m) => m.with_store(|s| s.delete_review(client, id))?,
            Backend::Postgres(p) => p.delete_review(client, id).await?,
        };
        tracing::info!(client = %client, review = %id, "review deleted");
        Ok(deleted)
    }

    pub async fn list_my_reviews(&self, client: ClientId, params: PageParams) -> Result<ReviewPage> {
        match self {
            Backend::Memory(m) => m.read(|s| s.list_my_reviews(client, &params)),
            Backend::Postgres(p) => p.list_my_reviews(client, &params).await,
        }
    }

    pub async fn list_mover_reviews(
        &self,
        mover: MoverId,
        params: PageParams,
    ) -> Result<ReviewPage> {
        match self {
            Backend::Memory(m) => m.read(|s| s.list_mover_reviews(mover, &params)),
            Backend::Postgres(p) => p.list_mover_reviews(mover, &params).await,
        }
    }

    pub async fn list_writable_estimates(
        &self,
        client: ClientId,
        params: PageParams,
    ) -> Result<EstimatePage> {
        match self {
            Backend::Memory(m) => m.read(|s| s.list_writable_estimates(client, &params)),
            Backend::Postgres(p) => p.list_writable_estimates(client, &params).await,
        }
    }

    pub async fn toggle_favorite(&self, client: ClientId, mover: MoverId) -> Result<ToggleOutcome> {
        let now = now_millis();
        let outcome = match self {
            Backend::Memory(m) => m.with_store(|s| s.toggle_favorite(client, mover, now))?,
            Backend::Postgres(p) => p.toggle_favorite(client, mover, now).await?,
        };
        tracing::info!(
            client = %client,
            mover = %mover,
            action = ?outcome.action,
            favorite_count = outcome.favorite_count,
            "favorite toggled"
        );
        Ok(outcome)
    }

    pub async fn list_favorites(&self, client: ClientId, params: PageParams) -> Result<FavoritePage> {
        match self {
            Backend::Memory(m) => m.read(|s| s.list_favorites(client, &params)),
            Backend::Postgres(p) => p.list_favorites(client, &params).await,
        }
    }

    pub async fn list_movers(&self, query: MoverQuery, viewer: Option<ClientId>) -> Result<MoverPage> {
        match self {
            Backend::Memory(m) => m.read(|s| s.list_movers(&query, viewer)),
            Backend::Postgres(p) => p.list_movers(&query, viewer).await,
        }
    }

    pub async fn get_mover(&self, id: MoverId, viewer: Option<ClientId>) -> Result<MoverView> {
        match self {
            Backend::Memory(m) => Ok(m.read(|s| s.get_mover(id, viewer))??),
            Backend::Postgres(p) => p.get_mover(id, viewer).await,
        }
    }
}
