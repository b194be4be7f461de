//! Promotion Repository

use shared::models::Promotion;
use sqlx::Sqlite;

use super::{RepoError, RepoResult};

const PROMOTION_COLUMNS: &str =
    "id, name, fixed_price, subscription_months, active, start_date, end_date, notes, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct NewPromotion {
    pub name: String,
    pub fixed_price: f64,
    pub subscription_months: Option<i64>,
    pub active: bool,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PromotionChanges {
    pub name: Option<String>,
    pub fixed_price: Option<f64>,
    pub subscription_months: Option<i64>,
    pub active: Option<bool>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub notes: Option<String>,
}

pub async fn find_all(exec: impl sqlx::Executor<'_, Database = Sqlite>) -> RepoResult<Vec<Promotion>> {
    let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotion ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Promotion>(&sql).fetch_all(exec).await?;
    Ok(rows)
}

pub async fn find_by_id(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Promotion>> {
    let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotion WHERE id = ?");
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn insert(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    data: &NewPromotion,
) -> RepoResult<Promotion> {
    let sql = format!(
        "INSERT INTO promotion (id, name, fixed_price, subscription_months, active, start_date, end_date, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING {PROMOTION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(&data.name)
        .bind(data.fixed_price)
        .bind(data.subscription_months)
        .bind(data.active)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.notes)
        .bind(shared::util::now_millis())
        .fetch_one(exec)
        .await?;
    Ok(row)
}

pub async fn update(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    data: &PromotionChanges,
) -> RepoResult<Promotion> {
    let sql = format!(
        "UPDATE promotion SET name = COALESCE(?1, name), fixed_price = COALESCE(?2, fixed_price), \
         subscription_months = COALESCE(?3, subscription_months), active = COALESCE(?4, active), \
         start_date = COALESCE(?5, start_date), end_date = COALESCE(?6, end_date), notes = COALESCE(?7, notes), \
         updated_at = ?8 WHERE id = ?9 RETURNING {PROMOTION_COLUMNS}"
    );
    sqlx::query_as::<_, Promotion>(&sql)
        .bind(&data.name)
        .bind(data.fixed_price)
        .bind(data.subscription_months)
        .bind(data.active)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.notes)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))
}
