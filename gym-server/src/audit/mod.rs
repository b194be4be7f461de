//! Change history writer
//!
//! Every create/update/delete on an audited entity appends one snapshot of
//! the post-change state to the entity's history table, plus one changelog
//! row per changed top-level field.
//!
//! ```text
//! service commit ──► record() ──► <entity>_history  (snapshot)
//!                            └──► field_change      (diff rows)
//! ```
//!
//! History is written after the primary commit. A failed history write is
//! logged and swallowed; the primary change stays committed.

pub mod diff;

use serde::Serialize;
use shared::models::{EntityKind, HistoryAction};
use sqlx::SqlitePool;

use crate::db;
use crate::db::repository::{RepoResult, history};

pub use diff::{FieldChange, diff_fields, snapshot};

/// Append history for one entity change. Never fails the caller.
pub async fn record<T: Serialize>(
    pool: &SqlitePool,
    kind: EntityKind,
    entity_id: i64,
    action: HistoryAction,
    before: Option<&T>,
    after: &T,
    at: i64,
) {
    if let Err(e) = write(pool, kind, entity_id, action, before, after, at).await {
        tracing::warn!(
            entity = kind.as_str(),
            entity_id,
            action = ?action,
            error = %e,
            "History write failed; change kept without history"
        );
    }
}

async fn write<T: Serialize>(
    pool: &SqlitePool,
    kind: EntityKind,
    entity_id: i64,
    action: HistoryAction,
    before: Option<&T>,
    after: &T,
    at: i64,
) -> RepoResult<()> {
    let after = snapshot(after);
    let before = before.map(snapshot);
    let changes = diff_fields(before.as_ref(), &after);

    let mut tx = db::begin_write(pool).await?;
    history::insert_snapshot(&mut *tx, kind, entity_id, action, &after, at).await?;
    for change in &changes {
        history::insert_field_change(
            &mut *tx,
            kind,
            entity_id,
            &change.field,
            change.from_text().as_deref(),
            change.to_text().as_deref(),
            at,
        )
        .await?;
    }
    tx.commit().await?;

    tracing::debug!(
        entity = kind.as_str(),
        entity_id,
        fields = changes.len(),
        "History recorded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_writes_snapshot_and_changelog() {
        let db = DbService::in_memory().await.unwrap();
        let before = json!({"id": 5, "full_name": "ANA", "phone": null});
        let after = json!({"id": 5, "full_name": "ANA MARIA", "phone": "555"});

        record(&db.pool, EntityKind::Client, 5, HistoryAction::Create, None, &before, 1_000).await;
        record(&db.pool, EntityKind::Client, 5, HistoryAction::Update, Some(&before), &after, 2_000)
            .await;

        let snapshots = history::list_snapshots(&db.pool, EntityKind::Client, 5, 10)
            .await
            .unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].action, HistoryAction::Update);
        assert_eq!(snapshots[0].changes["full_name"], "ANA MARIA");

        let last = history::last_field_change(&db.pool, EntityKind::Client, 5, "full_name")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.old_value.as_deref(), Some("ANA"));
        assert_eq!(last.new_value.as_deref(), Some("ANA MARIA"));
        assert_eq!(last.changed_at, 2_000);

        let all = history::list_field_changes(&db.pool, EntityKind::Client, 5)
            .await
            .unwrap();
        // create: full_name; update: full_name + phone
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let db = DbService::in_memory().await.unwrap();
        db.pool.close().await;

        // Closed pool: nothing is written and nothing panics
        record(&db.pool, EntityKind::Coach, 1, HistoryAction::Delete, None, &json!({}), 1).await;
    }
}
