//! Client Repository

use shared::models::{Client, SubscriptionPeriod};
use sqlx::Sqlite;

use super::{RepoError, RepoResult};

const CLIENT_COLUMNS: &str = "id, full_name, first_name, last_name, email, phone, national_id, date_of_birth, registration_date, subscription_period, notes, created_at, updated_at, deleted_at";

/// Validated values for a new client row
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub registration_date: i64,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub notes: Option<String>,
}

/// Validated partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: Option<i64>,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub notes: Option<String>,
}

/// Which unique field an existing client already holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientConflict {
    FullName,
    NationalId,
    Email,
}

pub async fn find_all(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    include_deleted: bool,
) -> RepoResult<Vec<Client>> {
    let filter = if include_deleted { "" } else { "WHERE deleted_at IS NULL" };
    let sql = format!("SELECT {CLIENT_COLUMNS} FROM client {filter} ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Client>(&sql).fetch_all(exec).await?;
    Ok(rows)
}

/// Any client, soft-deleted included
pub async fn find_by_id(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Client>> {
    let sql = format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = ?");
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn find_active_by_id(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Client>> {
    let sql = format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = ? AND deleted_at IS NULL");
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

/// First unique-field collision with another client.
///
/// Full name and national id are unique among non-deleted clients; email is
/// unique across all rows.
pub async fn find_conflict(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    full_name: &str,
    national_id: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<i64>,
) -> RepoResult<Option<ClientConflict>> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT CASE \
             WHEN deleted_at IS NULL AND full_name = ?1 THEN 'full_name' \
             WHEN deleted_at IS NULL AND national_id = ?2 THEN 'national_id' \
             ELSE 'email' END \
         FROM client \
         WHERE (?4 IS NULL OR id != ?4) \
           AND ((deleted_at IS NULL AND (full_name = ?1 OR (?2 IS NOT NULL AND national_id = ?2))) \
                OR (?3 IS NOT NULL AND email = ?3)) \
         LIMIT 1",
    )
    .bind(full_name)
    .bind(national_id)
    .bind(email)
    .bind(exclude_id)
    .fetch_optional(exec)
    .await?;

    Ok(row.map(|(field,)| match field.as_str() {
        "full_name" => ClientConflict::FullName,
        "national_id" => ClientConflict::NationalId,
        _ => ClientConflict::Email,
    }))
}

pub async fn insert(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    data: &NewClient,
) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO client (id, full_name, first_name, last_name, email, phone, national_id, date_of_birth, registration_date, subscription_period, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12) RETURNING {CLIENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .bind(&data.full_name)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.national_id)
        .bind(&data.date_of_birth)
        .bind(data.registration_date)
        .bind(data.subscription_period)
        .bind(&data.notes)
        .bind(now)
        .fetch_one(exec)
        .await?;
    Ok(row)
}

/// Partial update of a non-deleted client
pub async fn update(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    data: &ClientChanges,
) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE client SET full_name = COALESCE(?1, full_name), first_name = COALESCE(?2, first_name), last_name = COALESCE(?3, last_name), \
         email = COALESCE(?4, email), phone = COALESCE(?5, phone), national_id = COALESCE(?6, national_id), \
         date_of_birth = COALESCE(?7, date_of_birth), registration_date = COALESCE(?8, registration_date), \
         subscription_period = COALESCE(?9, subscription_period), notes = COALESCE(?10, notes), updated_at = ?11 \
         WHERE id = ?12 AND deleted_at IS NULL RETURNING {CLIENT_COLUMNS}"
    );
    sqlx::query_as::<_, Client>(&sql)
        .bind(&data.full_name)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.national_id)
        .bind(&data.date_of_birth)
        .bind(data.registration_date)
        .bind(data.subscription_period)
        .bind(&data.notes)
        .bind(now)
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}

pub async fn set_subscription_period(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    period: SubscriptionPeriod,
) -> RepoResult<()> {
    sqlx::query("UPDATE client SET subscription_period = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(period)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Mark deleted; returns the row as it now stands
pub async fn soft_delete(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Client> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE client SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL RETURNING {CLIENT_COLUMNS}"
    );
    sqlx::query_as::<_, Client>(&sql)
        .bind(now)
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Client {id} not found")))
}
