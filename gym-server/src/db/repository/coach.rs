//! Coach Repository

use shared::models::Coach;
use sqlx::Sqlite;

use super::{RepoError, RepoResult};

const COACH_COLUMNS: &str = "id, full_name, specialty, email, phone, national_id, date_of_birth, registration_date, notes, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, Default)]
pub struct NewCoach {
    pub full_name: String,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CoachChanges {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: Option<i64>,
    pub notes: Option<String>,
}

pub async fn find_all(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    include_deleted: bool,
) -> RepoResult<Vec<Coach>> {
    let filter = if include_deleted { "" } else { "WHERE deleted_at IS NULL" };
    let sql = format!("SELECT {COACH_COLUMNS} FROM coach {filter} ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Coach>(&sql).fetch_all(exec).await?;
    Ok(rows)
}

pub async fn find_by_id(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Coach>> {
    let sql = format!("SELECT {COACH_COLUMNS} FROM coach WHERE id = ?");
    let row = sqlx::query_as::<_, Coach>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn email_taken(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    email: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM coach WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1")
            .bind(email)
            .bind(exclude_id)
            .fetch_optional(exec)
            .await?;
    Ok(row.is_some())
}

pub async fn insert(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    data: &NewCoach,
) -> RepoResult<Coach> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO coach (id, full_name, specialty, email, phone, national_id, date_of_birth, registration_date, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING {COACH_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Coach>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(&data.full_name)
        .bind(&data.specialty)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.national_id)
        .bind(&data.date_of_birth)
        .bind(data.registration_date)
        .bind(&data.notes)
        .bind(now)
        .fetch_one(exec)
        .await?;
    Ok(row)
}

pub async fn update(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    data: &CoachChanges,
) -> RepoResult<Coach> {
    let sql = format!(
        "UPDATE coach SET full_name = COALESCE(?1, full_name), specialty = COALESCE(?2, specialty), email = COALESCE(?3, email), \
         phone = COALESCE(?4, phone), national_id = COALESCE(?5, national_id), date_of_birth = COALESCE(?6, date_of_birth), \
         registration_date = COALESCE(?7, registration_date), notes = COALESCE(?8, notes), updated_at = ?9 \
         WHERE id = ?10 AND deleted_at IS NULL RETURNING {COACH_COLUMNS}"
    );
    sqlx::query_as::<_, Coach>(&sql)
        .bind(&data.full_name)
        .bind(&data.specialty)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.national_id)
        .bind(&data.date_of_birth)
        .bind(data.registration_date)
        .bind(&data.notes)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coach {id} not found")))
}

pub async fn soft_delete(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Coach> {
    let sql = format!(
        "UPDATE coach SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL RETURNING {COACH_COLUMNS}"
    );
    sqlx::query_as::<_, Coach>(&sql)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coach {id} not found")))
}
