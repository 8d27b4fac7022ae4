//! Database operations for the clients table.

use mover_engine::{Client, ClientId, ClientProfile, Timestamp};
use sqlx::postgres::PgExecutor;

use super::rows::bigint;
use super::ClientRow;

/// Insert a client or replace its editable fields.
pub async fn upsert_client<'e>(
    executor: impl PgExecutor<'e>,
    id: ClientId,
    profile: &ClientProfile,
    now: Timestamp,
) -> Result<Client, sqlx::Error> {
    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        INSERT INTO clients (id, name, email, phone, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            phone = EXCLUDED.phone
        RETURNING id, name, email, phone, created_at
        "#,
    )
    .bind(id.as_uuid())
    .bind(profile.name.trim())
    .bind(profile.email.trim())
    .bind(profile.phone.as_deref())
    .bind(bigint(now)?)
    .fetch_one(executor)
    .await?;

    Ok(row.0)
}

/// Whether a client profile exists.
pub async fn client_exists<'e>(
    executor: impl PgExecutor<'e>,
    id: ClientId,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)")
        .bind(id.as_uuid())
        .fetch_one(executor)
        .await
}
