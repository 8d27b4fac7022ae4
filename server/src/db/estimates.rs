//! Database operations for move requests and estimates.

use mover_engine::{
    ClientId, Estimate, EstimateId, MoveRequest, PageRequest, RequestId, Timestamp,
    WritableEstimateView,
};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use super::rows::{bigint, to_unsigned, ESTIMATE_COLUMNS};
use super::{begin_read_snapshot, EstimateRow, RequestRow, WritableEstimateRow};

/// Insert a move request.
pub async fn insert_request<'e>(
    executor: impl PgExecutor<'e>,
    request: &MoveRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO move_requests (id, client_id, move_type, move_date, departure, arrival, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(request.id.as_uuid())
    .bind(request.client_id.as_uuid())
    .bind(request.move_type.as_str())
    .bind(bigint(request.move_date)?)
    .bind(&request.departure)
    .bind(&request.arrival)
    .bind(bigint(request.created_at)?)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get a move request by ID.
pub async fn get_request<'e>(
    executor: impl PgExecutor<'e>,
    id: RequestId,
) -> Result<Option<MoveRequest>, sqlx::Error> {
    let row = sqlx::query_as::<_, RequestRow>(
        r#"
        SELECT id, client_id, move_type, move_date, departure, arrival, created_at
        FROM move_requests
        WHERE id = $1
        "#,
    )
    .bind(id.as_uuid())
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|r| r.0))
}

/// Insert an estimate. Trips `estimates_request_mover_key` on a second bid.
pub async fn insert_estimate<'e>(
    executor: impl PgExecutor<'e>,
    estimate: &Estimate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO estimates (
            id, request_id, mover_id, client_id, price, comment,
            is_client_confirmed, confirmed_at, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(estimate.id.as_uuid())
    .bind(estimate.request_id.as_uuid())
    .bind(estimate.mover_id.as_uuid())
    .bind(estimate.client_id.as_uuid())
    .bind(bigint(estimate.price)?)
    .bind(&estimate.comment)
    .bind(estimate.is_client_confirmed)
    .bind(estimate.confirmed_at.map(bigint).transpose()?)
    .bind(bigint(estimate.created_at)?)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get an estimate by ID.
pub async fn get_estimate<'e>(
    executor: impl PgExecutor<'e>,
    id: EstimateId,
) -> Result<Option<Estimate>, sqlx::Error> {
    let sql = format!("SELECT {ESTIMATE_COLUMNS} FROM estimates e WHERE e.id = $1");
    let row = sqlx::query_as::<_, EstimateRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Get an estimate by ID and lock it for the rest of the transaction.
pub async fn lock_estimate<'e>(
    executor: impl PgExecutor<'e>,
    id: EstimateId,
) -> Result<Option<Estimate>, sqlx::Error> {
    let sql = format!("SELECT {ESTIMATE_COLUMNS} FROM estimates e WHERE e.id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, EstimateRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Mark an estimate confirmed. An earlier confirmation time is kept.
pub async fn confirm_estimate<'e>(
    executor: impl PgExecutor<'e>,
    id: EstimateId,
    now: Timestamp,
) -> Result<Option<Estimate>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE estimates AS e SET
            is_client_confirmed = TRUE,
            confirmed_at = COALESCE(e.confirmed_at, $2)
        WHERE e.id = $1
        RETURNING {ESTIMATE_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, EstimateRow>(&sql)
        .bind(id.as_uuid())
        .bind(bigint(now)?)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Confirmed, unreviewed estimates of a client, newest first, and their total.
pub async fn list_writable_estimates(
    pool: &PgPool,
    client: ClientId,
    page: &PageRequest,
) -> Result<(Vec<WritableEstimateView>, u64), sqlx::Error> {
    let mut tx = begin_read_snapshot(pool).await?;

    let filter = r#"
        e.client_id = $1
        AND e.is_client_confirmed
        AND NOT EXISTS (SELECT 1 FROM reviews r WHERE r.estimate_id = e.id)
    "#;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM estimates e WHERE {filter}"))
            .bind(client.as_uuid())
            .fetch_one(&mut *tx)
            .await?;

    let sql = format!(
        r#"
        SELECT {ESTIMATE_COLUMNS},
               q.move_type, q.move_date, q.departure, q.arrival,
               m.nickname AS mover_nickname
        FROM estimates e
        JOIN move_requests q ON q.id = e.request_id
        JOIN movers m ON m.id = e.mover_id
        WHERE {filter}
        ORDER BY e.created_at DESC, e.id ASC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, WritableEstimateRow>(&sql)
        .bind(client.as_uuid())
        .bind(i64::from(page.limit))
        .bind(bigint(page.offset())?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((rows.into_iter().map(|r| r.0).collect(), to_unsigned(total)?))
}
