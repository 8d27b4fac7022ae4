//! Row decoding for marketplace tables.
//!
//! Engine types live in another crate, so each table gets a local wrapper
//! implementing [`sqlx::FromRow`]. Timestamps are stored as `BIGINT`
//! milliseconds and counters as `BIGINT`.

use mover_engine::{
    Client, ClientId, Estimate, EstimateId, FavoriteMoverView, MoveRequest, MoveType, Mover,
    MoverAggregates, MoverId, RequestId, Review, ReviewId, ReviewView, WritableEstimateView,
};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

/// Columns selected for a mover, qualified with the `m` alias.
pub(crate) const MOVER_COLUMNS: &str = "m.id, m.nickname, m.introduction, m.description, \
     m.career, m.service_types, m.service_regions, m.review_count, m.average_review_rating, \
     m.estimate_count, m.favorite_count, m.created_at";

/// Columns selected for an estimate, qualified with the `e` alias.
pub(crate) const ESTIMATE_COLUMNS: &str = "e.id, e.request_id, e.mover_id, e.client_id, \
     e.price, e.comment, e.is_client_confirmed, e.confirmed_at, e.created_at";

/// Columns selected for a review, qualified with the `r` alias.
pub(crate) const REVIEW_COLUMNS: &str = "r.id, r.estimate_id, r.mover_id, r.client_id, \
     r.rating, r.content, r.created_at, r.updated_at";

fn decode(e: mover_engine::Error) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

fn id_column(row: &PgRow, column: &str) -> Result<Uuid, sqlx::Error> {
    row.try_get(column)
}

/// Bind a timestamp, price or offset to a `BIGINT` parameter.
pub(crate) fn bigint(value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Read back a `BIGINT` that only ever holds non-negative values.
pub(crate) fn to_unsigned(value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// A `BIGINT` column holding a timestamp or a counter.
fn unsigned(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    to_unsigned(row.try_get(column)?)
}

pub(crate) fn aggregates_from_row(row: &PgRow) -> Result<MoverAggregates, sqlx::Error> {
    Ok(MoverAggregates {
        review_count: unsigned(row, "review_count")?,
        average_review_rating: row.try_get("average_review_rating")?,
        estimate_count: unsigned(row, "estimate_count")?,
        favorite_count: unsigned(row, "favorite_count")?,
    })
}

fn mover_from_row(row: &PgRow) -> Result<Mover, sqlx::Error> {
    let service_types: Vec<String> = row.try_get("service_types")?;
    let service_types = service_types
        .iter()
        .map(|s| s.parse::<MoveType>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(decode)?;
    let career: i32 = row.try_get("career")?;

    Ok(Mover {
        id: MoverId::from_uuid(id_column(row, "id")?),
        nickname: row.try_get("nickname")?,
        introduction: row.try_get("introduction")?,
        description: row.try_get("description")?,
        career: u32::try_from(career).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        service_types,
        service_regions: row.try_get("service_regions")?,
        aggregates: aggregates_from_row(row)?,
        created_at: unsigned(row, "created_at")?,
    })
}

fn estimate_from_row(row: &PgRow) -> Result<Estimate, sqlx::Error> {
    let price: i64 = row.try_get("price")?;
    let confirmed_at: Option<i64> = row.try_get("confirmed_at")?;

    Ok(Estimate {
        id: EstimateId::from_uuid(id_column(row, "id")?),
        request_id: RequestId::from_uuid(id_column(row, "request_id")?),
        mover_id: MoverId::from_uuid(id_column(row, "mover_id")?),
        client_id: ClientId::from_uuid(id_column(row, "client_id")?),
        price: to_unsigned(price)?,
        comment: row.try_get("comment")?,
        is_client_confirmed: row.try_get("is_client_confirmed")?,
        confirmed_at: confirmed_at.map(to_unsigned).transpose()?,
        created_at: unsigned(row, "created_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<Review, sqlx::Error> {
    let rating: i16 = row.try_get("rating")?;

    Ok(Review {
        id: ReviewId::from_uuid(id_column(row, "id")?),
        estimate_id: EstimateId::from_uuid(id_column(row, "estimate_id")?),
        mover_id: MoverId::from_uuid(id_column(row, "mover_id")?),
        client_id: ClientId::from_uuid(id_column(row, "client_id")?),
        rating: u8::try_from(rating).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        content: row.try_get("content")?,
        created_at: unsigned(row, "created_at")?,
        updated_at: unsigned(row, "updated_at")?,
    })
}

pub struct ClientRow(pub Client);

impl<'r> FromRow<'r, PgRow> for ClientRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ClientRow(Client {
            id: ClientId::from_uuid(id_column(row, "id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: unsigned(row, "created_at")?,
        }))
    }
}

pub struct MoverRow(pub Mover);

impl<'r> FromRow<'r, PgRow> for MoverRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        mover_from_row(row).map(MoverRow)
    }
}

pub struct RequestRow(pub MoveRequest);

impl<'r> FromRow<'r, PgRow> for RequestRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let move_type: String = row.try_get("move_type")?;
        Ok(RequestRow(MoveRequest {
            id: RequestId::from_uuid(id_column(row, "id")?),
            client_id: ClientId::from_uuid(id_column(row, "client_id")?),
            move_type: move_type.parse().map_err(decode)?,
            move_date: unsigned(row, "move_date")?,
            departure: row.try_get("departure")?,
            arrival: row.try_get("arrival")?,
            created_at: unsigned(row, "created_at")?,
        }))
    }
}

pub struct EstimateRow(pub Estimate);

impl<'r> FromRow<'r, PgRow> for EstimateRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        estimate_from_row(row).map(EstimateRow)
    }
}

pub struct ReviewRow(pub Review);

impl<'r> FromRow<'r, PgRow> for ReviewRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        review_from_row(row).map(ReviewRow)
    }
}

/// A review joined with `mover_nickname` and `client_name`, either of which may be NULL.
pub struct ReviewViewRow(pub ReviewView);

impl<'r> FromRow<'r, PgRow> for ReviewViewRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ReviewViewRow(ReviewView {
            review: review_from_row(row)?,
            mover_nickname: row.try_get("mover_nickname")?,
            client_name: row.try_get("client_name")?,
        }))
    }
}

/// A mover joined with the time the viewer favorited it.
pub struct FavoriteMoverRow(pub FavoriteMoverView);

impl<'r> FromRow<'r, PgRow> for FavoriteMoverRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(FavoriteMoverRow(FavoriteMoverView {
            mover: mover_from_row(row)?,
            is_liked: true,
            favorited_at: unsigned(row, "favorited_at")?,
        }))
    }
}

/// An estimate joined with its request and the mover's nickname.
pub struct WritableEstimateRow(pub WritableEstimateView);

impl<'r> FromRow<'r, PgRow> for WritableEstimateRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let move_type: String = row.try_get("move_type")?;
        Ok(WritableEstimateRow(WritableEstimateView {
            estimate: estimate_from_row(row)?,
            move_type: move_type.parse().map_err(decode)?,
            move_date: unsigned(row, "move_date")?,
            departure: row.try_get("departure")?,
            arrival: row.try_get("arrival")?,
            mover_nickname: row.try_get("mover_nickname")?,
        }))
    }
}
