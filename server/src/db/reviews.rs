//! Database operations for the reviews table.

use mover_engine::{
    ClientId, EstimateId, MoverId, PageRequest, Review, ReviewDraft, ReviewId, ReviewView,
    Timestamp,
};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use super::rows::{bigint, to_unsigned, REVIEW_COLUMNS};
use super::{begin_read_snapshot, ReviewRow, ReviewViewRow};

/// Insert a review. Trips `reviews_estimate_id_key` if the estimate already has one.
pub async fn insert_review<'e>(
    executor: impl PgExecutor<'e>,
    review: &Review,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO reviews (
            id, estimate_id, mover_id, client_id, rating, content, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(review.id.as_uuid())
    .bind(review.estimate_id.as_uuid())
    .bind(review.mover_id.as_uuid())
    .bind(review.client_id.as_uuid())
    .bind(i16::from(review.rating))
    .bind(&review.content)
    .bind(bigint(review.created_at)?)
    .bind(bigint(review.updated_at)?)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get a review by ID.
pub async fn get_review<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
) -> Result<Option<Review>, sqlx::Error> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = $1");
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Whether an estimate already has a review.
pub async fn review_exists_for_estimate<'e>(
    executor: impl PgExecutor<'e>,
    estimate: EstimateId,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM reviews WHERE estimate_id = $1)")
        .bind(estimate.as_uuid())
        .fetch_one(executor)
        .await
}

/// Replace rating and content. Returns `None` if the review is gone.
pub async fn update_review<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
    draft: &ReviewDraft,
    now: Timestamp,
) -> Result<Option<Review>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE reviews AS r SET rating = $2, content = $3, updated_at = $4
        WHERE r.id = $1
        RETURNING {REVIEW_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(id.as_uuid())
        .bind(i16::from(draft.rating))
        .bind(&draft.content)
        .bind(bigint(now)?)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Delete a review. Returns `false` if there was nothing to delete.
pub async fn delete_review<'e>(
    executor: impl PgExecutor<'e>,
    id: ReviewId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id.as_uuid())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Reviews written by a client with the mover's nickname, newest first.
pub async fn list_client_reviews(
    pool: &PgPool,
    client: ClientId,
    page: &PageRequest,
) -> Result<(Vec<ReviewView>, u64), sqlx::Error> {
    let mut tx = begin_read_snapshot(pool).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE client_id = $1")
        .bind(client.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!(
        r#"
        SELECT {REVIEW_COLUMNS}, m.nickname AS mover_nickname, NULL::TEXT AS client_name
        FROM reviews r
        LEFT JOIN movers m ON m.id = r.mover_id
        WHERE r.client_id = $1
        ORDER BY r.created_at DESC, r.id ASC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, ReviewViewRow>(&sql)
        .bind(client.as_uuid())
        .bind(i64::from(page.limit))
        .bind(bigint(page.offset())?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((rows.into_iter().map(|r| r.0).collect(), to_unsigned(total)?))
}

/// Reviews of a mover with the client's name, newest first.
pub async fn list_mover_reviews(
    pool: &PgPool,
    mover: MoverId,
    page: &PageRequest,
) -> Result<(Vec<ReviewView>, u64), sqlx::Error> {
    let mut tx = begin_read_snapshot(pool).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE mover_id = $1")
        .bind(mover.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!(
        r#"
        SELECT {REVIEW_COLUMNS}, NULL::TEXT AS mover_nickname, c.name AS client_name
        FROM reviews r
        LEFT JOIN clients c ON c.id = r.client_id
        WHERE r.mover_id = $1
        ORDER BY r.created_at DESC, r.id ASC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, ReviewViewRow>(&sql)
        .bind(mover.as_uuid())
        .bind(i64::from(page.limit))
        .bind(bigint(page.offset())?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((rows.into_iter().map(|r| r.0).collect(), to_unsigned(total)?))
}
