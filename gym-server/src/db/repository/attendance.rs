//! Attendance Repository

use shared::models::{Attendance, AttendanceWithClient};
use sqlx::Sqlite;

use super::RepoResult;

/// Check-ins in `[start, end)`, newest first
pub async fn find_between(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    start: i64,
    end: i64,
) -> RepoResult<Vec<AttendanceWithClient>> {
    let rows = sqlx::query_as::<_, AttendanceWithClient>(
        "SELECT a.id, a.client_id, a.checked_in_at, a.created_at, c.full_name AS client_full_name \
         FROM attendance a JOIN client c ON c.id = a.client_id \
         WHERE a.checked_in_at >= ?1 AND a.checked_in_at < ?2 \
         ORDER BY a.checked_in_at DESC, a.id DESC",
    )
    .bind(start)
    .bind(end)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Id of the client's check-in in `[start, end)`, if any
pub async fn find_for_client_between(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    client_id: i64,
    start: i64,
    end: i64,
) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM attendance WHERE client_id = ?1 AND checked_in_at >= ?2 AND checked_in_at < ?3 LIMIT 1",
    )
    .bind(client_id)
    .bind(start)
    .bind(end)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn count_between(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    start: i64,
    end: i64,
) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance WHERE checked_in_at >= ?1 AND checked_in_at < ?2",
    )
    .bind(start)
    .bind(end)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

pub async fn insert(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    client_id: i64,
    checked_in_at: i64,
) -> RepoResult<Attendance> {
    let row = sqlx::query_as::<_, Attendance>(
        "INSERT INTO attendance (id, client_id, checked_in_at, created_at) VALUES (?1, ?2, ?3, ?4) \
         RETURNING id, client_id, checked_in_at, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(client_id)
    .bind(checked_in_at)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(row)
}

/// Hard delete; `false` when no row matched
pub async fn delete(exec: impl sqlx::Executor<'_, Database = Sqlite>, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}
