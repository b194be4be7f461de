//! Change history: per-entity snapshot logs and the field changelog

use shared::models::{EntityKind, FieldChangeRecord, HistoryAction, HistoryEntry};
use sqlx::Sqlite;

use super::RepoResult;

/// (snapshot table, entity id column)
fn snapshot_table(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Client => ("client_history", "client_id"),
        EntityKind::Coach => ("coach_history", "coach_id"),
        EntityKind::Payment => ("payment_history", "payment_id"),
        EntityKind::Promotion => ("promotion_history", "promotion_id"),
    }
}

pub async fn insert_snapshot(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    kind: EntityKind,
    entity_id: i64,
    action: HistoryAction,
    snapshot: &serde_json::Value,
    at: i64,
) -> RepoResult<()> {
    let (table, column) = snapshot_table(kind);
    let sql = format!("INSERT INTO {table} ({column}, action, changes, created_at) VALUES (?1, ?2, ?3, ?4)");
    sqlx::query(&sql)
        .bind(entity_id)
        .bind(action)
        .bind(sqlx::types::Json(snapshot))
        .bind(at)
        .execute(exec)
        .await?;
    Ok(())
}

/// Snapshot log of one entity, newest first
pub async fn list_snapshots(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    kind: EntityKind,
    entity_id: i64,
    limit: i64,
) -> RepoResult<Vec<HistoryEntry>> {
    let (table, column) = snapshot_table(kind);
    let sql = format!(
        "SELECT id, {column} AS entity_id, action, changes, created_at FROM {table} \
         WHERE {column} = ? ORDER BY id DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, HistoryEntry>(&sql)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

pub async fn insert_field_change(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    kind: EntityKind,
    entity_id: i64,
    field: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    at: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO field_change (entity_type, entity_id, field, old_value, new_value, changed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(kind.as_str())
    .bind(entity_id)
    .bind(field)
    .bind(old_value)
    .bind(new_value)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Most recent changelog row for one field of one entity
pub async fn last_field_change(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    kind: EntityKind,
    entity_id: i64,
    field: &str,
) -> RepoResult<Option<FieldChangeRecord>> {
    let row = sqlx::query_as::<_, FieldChangeRecord>(
        "SELECT id, entity_type, entity_id, field, old_value, new_value, changed_at FROM field_change \
         WHERE entity_type = ?1 AND entity_id = ?2 AND field = ?3 \
         ORDER BY changed_at DESC, id DESC LIMIT 1",
    )
    .bind(kind.as_str())
    .bind(entity_id)
    .bind(field)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

pub async fn list_field_changes(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    kind: EntityKind,
    entity_id: i64,
) -> RepoResult<Vec<FieldChangeRecord>> {
    let rows = sqlx::query_as::<_, FieldChangeRecord>(
        "SELECT id, entity_type, entity_id, field, old_value, new_value, changed_at FROM field_change \
         WHERE entity_type = ?1 AND entity_id = ?2 ORDER BY changed_at DESC, id DESC",
    )
    .bind(kind.as_str())
    .bind(entity_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use serde_json::json;

    #[tokio::test]
    async fn test_snapshots_newest_first() {
        let db = DbService::in_memory().await.unwrap();
        insert_snapshot(&db.pool, EntityKind::Client, 7, HistoryAction::Create, &json!({"full_name": "A"}), 1)
            .await
            .unwrap();
        insert_snapshot(&db.pool, EntityKind::Client, 7, HistoryAction::Update, &json!({"full_name": "B"}), 2)
            .await
            .unwrap();
        insert_snapshot(&db.pool, EntityKind::Coach, 7, HistoryAction::Create, &json!({}), 3)
            .await
            .unwrap();

        let entries = list_snapshots(&db.pool, EntityKind::Client, 7, 50).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, HistoryAction::Update);
        assert_eq!(entries[0].changes["full_name"], "B");
        assert_eq!(entries[0].entity_id, 7);
    }

    #[tokio::test]
    async fn test_last_field_change() {
        let db = DbService::in_memory().await.unwrap();
        assert!(last_field_change(&db.pool, EntityKind::Client, 1, "full_name").await.unwrap().is_none());

        insert_field_change(&db.pool, EntityKind::Client, 1, "full_name", None, Some("\"A\""), 10)
            .await
            .unwrap();
        insert_field_change(&db.pool, EntityKind::Client, 1, "full_name", Some("\"A\""), Some("\"B\""), 20)
            .await
            .unwrap();
        insert_field_change(&db.pool, EntityKind::Client, 1, "phone", None, Some("\"06\""), 30)
            .await
            .unwrap();

        let last = last_field_change(&db.pool, EntityKind::Client, 1, "full_name")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.changed_at, 20);
        assert_eq!(last.new_value.as_deref(), Some("\"B\""));
        assert_eq!(list_field_changes(&db.pool, EntityKind::Client, 1).await.unwrap().len(), 3);
    }
}
