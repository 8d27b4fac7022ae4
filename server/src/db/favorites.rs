//! Database operations for the favorites table.

use std::collections::HashSet;

use mover_engine::{ClientId, FavoriteMoverView, MoverId, PageRequest, Timestamp};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{bigint, to_unsigned, MOVER_COLUMNS};
use super::{begin_read_snapshot, FavoriteMoverRow};

/// Insert a favorite. Returns `false` if the pair already existed.
pub async fn insert_favorite<'e>(
    executor: impl PgExecutor<'e>,
    client: ClientId,
    mover: MoverId,
    now: Timestamp,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO favorites (client_id, mover_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (client_id, mover_id) DO NOTHING
        "#,
    )
    .bind(client.as_uuid())
    .bind(mover.as_uuid())
    .bind(bigint(now)?)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a favorite. Returns `false` if the pair did not exist.
pub async fn delete_favorite<'e>(
    executor: impl PgExecutor<'e>,
    client: ClientId,
    mover: MoverId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE client_id = $1 AND mover_id = $2")
        .bind(client.as_uuid())
        .bind(mover.as_uuid())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a client has favorited a mover.
pub async fn is_favorite<'e>(
    executor: impl PgExecutor<'e>,
    client: ClientId,
    mover: MoverId,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM favorites WHERE client_id = $1 AND mover_id = $2)",
    )
    .bind(client.as_uuid())
    .bind(mover.as_uuid())
    .fetch_one(executor)
    .await
}

/// Which of `movers` the client has favorited, in a single query.
pub async fn favorited_among<'e>(
    executor: impl PgExecutor<'e>,
    client: ClientId,
    movers: &[MoverId],
) -> Result<HashSet<MoverId>, sqlx::Error> {
    if movers.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<Uuid> = movers.iter().map(MoverId::as_uuid).collect();
    let liked: Vec<Uuid> = sqlx::query_scalar(
        "SELECT mover_id FROM favorites WHERE client_id = $1 AND mover_id = ANY($2)",
    )
    .bind(client.as_uuid())
    .bind(ids)
    .fetch_all(executor)
    .await?;
    Ok(liked.into_iter().map(MoverId::from_uuid).collect())
}

/// A client's favorite movers, most recently liked first, and their total.
pub async fn list_favorites(
    pool: &PgPool,
    client: ClientId,
    page: &PageRequest,
) -> Result<(Vec<FavoriteMoverView>, u64), sqlx::Error> {
    let mut tx = begin_read_snapshot(pool).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE client_id = $1")
        .bind(client.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!(
        r#"
        SELECT {MOVER_COLUMNS}, f.created_at AS favorited_at
        FROM favorites f
        JOIN movers m ON m.id = f.mover_id
        WHERE f.client_id = $1
        ORDER BY f.created_at DESC, m.id ASC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, FavoriteMoverRow>(&sql)
        .bind(client.as_uuid())
        .bind(i64::from(page.limit))
        .bind(bigint(page.offset())?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((rows.into_iter().map(|r| r.0).collect(), to_unsigned(total)?))
}
