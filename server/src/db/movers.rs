//! Database operations for the movers table, including the aggregate refresh.

use mover_engine::{
    Mover, MoverAggregates, MoverId, MoverProfile, MoverQuery, SortBy, Timestamp,
};
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::PgPool;

use super::rows::{aggregates_from_row, bigint, to_unsigned, MOVER_COLUMNS};
use super::{begin_read_snapshot, MoverRow};

/// Insert a mover or replace its editable fields. Aggregates are never written here.
pub async fn upsert_mover<'e>(
    executor: impl PgExecutor<'e>,
    id: MoverId,
    profile: &MoverProfile,
    now: Timestamp,
) -> Result<Mover, sqlx::Error> {
    let service_types: Vec<&str> = profile.service_types.iter().map(|t| t.as_str()).collect();
    let career = i32::try_from(profile.career).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let sql = format!(
        r#"
        INSERT INTO movers AS m (
            id, nickname, introduction, description, career,
            service_types, service_regions, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE SET
            nickname = EXCLUDED.nickname,
            introduction = EXCLUDED.introduction,
            description = EXCLUDED.description,
            career = EXCLUDED.career,
            service_types = EXCLUDED.service_types,
            service_regions = EXCLUDED.service_regions
        RETURNING {MOVER_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, MoverRow>(&sql)
        .bind(id.as_uuid())
        .bind(profile.nickname.trim())
        .bind(&profile.introduction)
        .bind(&profile.description)
        .bind(career)
        .bind(service_types)
        .bind(&profile.service_regions)
        .bind(bigint(now)?)
        .fetch_one(executor)
        .await?;

    Ok(row.0)
}

/// Lock a mover row for the rest of the transaction.
///
/// Returns `false` if the mover does not exist.
pub async fn lock_mover<'e>(
    executor: impl PgExecutor<'e>,
    id: MoverId,
) -> Result<bool, sqlx::Error> {
    let locked = sqlx::query("SELECT id FROM movers WHERE id = $1 FOR UPDATE")
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(locked.is_some())
}

/// Recompute every aggregate counter of a mover from its rows.
///
/// This is the only statement that writes the counters. Call it after any
/// row change that affects a mover, inside the same transaction.
pub async fn refresh_aggregates<'e>(
    executor: impl PgExecutor<'e>,
    id: MoverId,
) -> Result<MoverAggregates, sqlx::Error> {
    let row: PgRow = sqlx::query(
        r#"
        UPDATE movers SET
            review_count = stats.review_count,
            average_review_rating = stats.average_review_rating,
            estimate_count = (SELECT COUNT(*) FROM estimates WHERE mover_id = $1),
            favorite_count = (SELECT COUNT(*) FROM favorites WHERE mover_id = $1)
        FROM (
            SELECT COUNT(*) AS review_count,
                   COALESCE(AVG(rating)::DOUBLE PRECISION, 0) AS average_review_rating
            FROM reviews
            WHERE mover_id = $1
        ) AS stats
        WHERE movers.id = $1
        RETURNING movers.review_count, movers.average_review_rating,
                  movers.estimate_count, movers.favorite_count
        "#,
    )
    .bind(id.as_uuid())
    .fetch_one(executor)
    .await?;

    aggregates_from_row(&row)
}

/// Get a mover by ID.
pub async fn get_mover<'e>(
    executor: impl PgExecutor<'e>,
    id: MoverId,
) -> Result<Option<Mover>, sqlx::Error> {
    let sql = format!("SELECT {MOVER_COLUMNS} FROM movers m WHERE m.id = $1");
    let row = sqlx::query_as::<_, MoverRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// `ORDER BY` clause for a directory ordering. Ties always fall back to id.
fn order_by(sort: Option<SortBy>) -> &'static str {
    match sort {
        None => "m.id ASC",
        Some(SortBy::HighRating) => "m.average_review_rating DESC, m.review_count DESC, m.id ASC",
        Some(SortBy::ReviewCount) => "m.review_count DESC, m.id ASC",
        Some(SortBy::Experience) => "m.career DESC, m.id ASC",
        Some(SortBy::EstimateCount) => "m.estimate_count DESC, m.id ASC",
        Some(SortBy::FavoriteCount) => "m.favorite_count DESC, m.id ASC",
    }
}

/// One page of the mover directory and the total number of matches.
pub async fn list_movers(
    pool: &PgPool,
    query: &MoverQuery,
) -> Result<(Vec<Mover>, u64), sqlx::Error> {
    let mut tx = begin_read_snapshot(pool).await?;

    // strpos avoids escaping LIKE wildcards in the needle.
    let filter = "($1::TEXT IS NULL OR strpos(lower(m.nickname), $1) > 0)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM movers m WHERE {filter}"))
        .bind(query.search.as_deref())
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!(
        "SELECT {MOVER_COLUMNS} FROM movers m WHERE {filter} ORDER BY {} LIMIT $2 OFFSET $3",
        order_by(query.sort_by)
    );
    let rows = sqlx::query_as::<_, MoverRow>(&sql)
        .bind(query.search.as_deref())
        .bind(i64::from(query.page.limit))
        .bind(bigint(query.page.offset())?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((rows.into_iter().map(|r| r.0).collect(), to_unsigned(total)?))
}
