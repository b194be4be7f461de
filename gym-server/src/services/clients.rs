//! Client registry writes
//!
//! sanitize → validate → uniqueness → age → (rename) throttle → write → history

use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{Client, ClientCreate, ClientUpdate, EntityKind, HistoryAction};
use shared::util::millis_to_utc;
use sqlx::SqlitePool;

use super::ClientLocks;
use crate::audit;
use crate::db::repository::client::{self, ClientChanges, ClientConflict, NewClient};
use crate::db::repository::{RepoError, history};
use crate::ledger::{self, LedgerError, NameSnapshot};
use crate::utils::time::{age_on, parse_loose_date, parse_optional_instant};
use crate::utils::validation::{
    self, MAX_FULL_NAME_LEN, MAX_NAME_PART_LEN, MAX_NOTE_LEN, MIN_CLIENT_AGE,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Snapshots scanned when the changelog has no full-name row
const SNAPSHOT_SCAN_LIMIT: i64 = 50;

pub struct ClientService<'a> {
    pool: &'a SqlitePool,
    locks: &'a ClientLocks,
}

impl<'a> ClientService<'a> {
    pub fn new(pool: &'a SqlitePool, locks: &'a ClientLocks) -> Self {
        Self { pool, locks }
    }

    pub async fn create(&self, req: ClientCreate, now: DateTime<Utc>) -> AppResult<Client> {
        let full_name = validation::required_person_name(
            "full_name",
            Some(req.full_name.as_str()),
            MAX_FULL_NAME_LEN,
        )?
        .to_uppercase();

        let data = NewClient {
            first_name: validation::optional_person_name(
                "first_name",
                req.first_name.as_deref(),
                MAX_NAME_PART_LEN,
            )?,
            last_name: validation::optional_person_name(
                "last_name",
                req.last_name.as_deref(),
                MAX_NAME_PART_LEN,
            )?,
            email: validation::email(req.email.as_deref())?,
            phone: validation::client_phone(req.phone.as_deref()),
            national_id: validation::national_id(req.national_id.as_deref())?,
            date_of_birth: birth_date(req.date_of_birth.as_deref(), now)?,
            registration_date: parse_optional_instant(
                "registration_date",
                req.registration_date.as_deref(),
            )?
            .unwrap_or(now)
            .timestamp_millis(),
            subscription_period: req.subscription_period,
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?,
            full_name,
        };

        let conflict = client::find_conflict(
            self.pool,
            &data.full_name,
            data.national_id.as_deref(),
            data.email.as_deref(),
            None,
        )
        .await?;
        if let Some(conflict) = conflict {
            return Err(conflict_error(conflict));
        }

        let created = client::insert(self.pool, &data).await.map_err(write_error)?;
        tracing::info!(client_id = created.id, full_name = %created.full_name, "Client created");

        audit::record(
            self.pool,
            EntityKind::Client,
            created.id,
            HistoryAction::Create,
            None,
            &created,
            now.timestamp_millis(),
        )
        .await;
        Ok(created)
    }

    /// Partial update; absent fields keep their stored value.
    pub async fn update(&self, id: i64, req: ClientUpdate, now: DateTime<Utc>) -> AppResult<Client> {
        let changes = ClientChanges {
            full_name: validation::optional_person_name(
                "full_name",
                req.full_name.as_deref(),
                MAX_FULL_NAME_LEN,
            )?
            .map(|name| name.to_uppercase()),
            first_name: validation::optional_person_name(
                "first_name",
                req.first_name.as_deref(),
                MAX_NAME_PART_LEN,
            )?,
            last_name: validation::optional_person_name(
                "last_name",
                req.last_name.as_deref(),
                MAX_NAME_PART_LEN,
            )?,
            email: validation::email(req.email.as_deref())?,
            phone: validation::client_phone(req.phone.as_deref()),
            national_id: validation::national_id(req.national_id.as_deref())?,
            date_of_birth: birth_date(req.date_of_birth.as_deref(), now)?,
            registration_date: parse_optional_instant(
                "registration_date",
                req.registration_date.as_deref(),
            )?
            .map(|dt| dt.timestamp_millis()),
            subscription_period: req.subscription_period,
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?,
        };

        let _guard = self.locks.acquire(id).await;

        let current = client::find_active_by_id(self.pool, id)
            .await?
            .ok_or(LedgerError::ClientNotFound(id))?;

        let full_name = changes.full_name.as_deref().unwrap_or(current.full_name.as_str());
        let conflict = client::find_conflict(
            self.pool,
            full_name,
            changes.national_id.as_deref().or(current.national_id.as_deref()),
            changes.email.as_deref().or(current.email.as_deref()),
            Some(id),
        )
        .await?;
        if let Some(conflict) = conflict {
            return Err(conflict_error(conflict));
        }

        if full_name != current.full_name {
            let last_change = self.last_name_change(&current).await?;
            ledger::check_name_change(&current.full_name, full_name, last_change, now)
                .inspect_err(|e| tracing::info!(client_id = id, error = %e, "Rename refused"))?;
        }

        let updated = client::update(self.pool, id, &changes)
            .await
            .map_err(write_error)?;
        tracing::info!(client_id = id, "Client updated");

        audit::record(
            self.pool,
            EntityKind::Client,
            id,
            HistoryAction::Update,
            Some(&current),
            &updated,
            now.timestamp_millis(),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, now: DateTime<Utc>) -> AppResult<Client> {
        let _guard = self.locks.acquire(id).await;

        let current = client::find_active_by_id(self.pool, id)
            .await?
            .ok_or(LedgerError::ClientNotFound(id))?;
        let deleted = client::soft_delete(self.pool, id).await.map_err(|e| match e {
            RepoError::NotFound(_) => LedgerError::ClientNotFound(id).into(),
            other => AppError::from(other),
        })?;
        tracing::info!(client_id = id, "Client deleted");

        audit::record(
            self.pool,
            EntityKind::Client,
            id,
            HistoryAction::Delete,
            Some(&current),
            &deleted,
            now.timestamp_millis(),
        )
        .await;
        Ok(deleted)
    }

    /// Last recorded full-name change: changelog first, snapshot scan as fallback
    async fn last_name_change(&self, current: &Client) -> AppResult<Option<DateTime<Utc>>> {
        let row =
            history::last_field_change(self.pool, EntityKind::Client, current.id, "full_name")
                .await?;
        if let Some(row) = row {
            return Ok(Some(millis_to_utc(row.changed_at)));
        }

        let snapshots = history::list_snapshots(
            self.pool,
            EntityKind::Client,
            current.id,
            SNAPSHOT_SCAN_LIMIT,
        )
        .await?
        .into_iter()
        .map(|entry| NameSnapshot {
            full_name: entry
                .changes
                .get("full_name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            recorded_at: millis_to_utc(entry.created_at),
        })
        .collect::<Vec<_>>();

        Ok(ledger::last_change_from_snapshots(&snapshots, &current.full_name))
    }
}

/// Parse and age-check a date of birth, returning `YYYY-MM-DD`.
fn birth_date(input: Option<&str>, now: DateTime<Utc>) -> AppResult<Option<String>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let birth: NaiveDate = parse_loose_date(raw).ok_or_else(|| {
        AppError::invalid_field("date_of_birth", format!("Invalid date of birth: {raw}"))
    })?;

    let age = age_on(birth, now.date_naive());
    if age < MIN_CLIENT_AGE {
        return Err(AppError::new(ErrorCode::ClientTooYoung)
            .with_detail("age", age)
            .with_detail("min_age", MIN_CLIENT_AGE));
    }
    Ok(Some(birth.format("%Y-%m-%d").to_string()))
}

fn conflict_error(conflict: ClientConflict) -> AppError {
    match conflict {
        ClientConflict::FullName => AppError::new(ErrorCode::ClientNameExists),
        ClientConflict::NationalId => AppError::new(ErrorCode::ClientNationalIdExists),
        ClientConflict::Email => AppError::new(ErrorCode::EmailExists),
    }
}

/// Unique-index violations that slipped past the pre-check
fn write_error(err: RepoError) -> AppError {
    match err.duplicate_column() {
        Some("full_name") => conflict_error(ClientConflict::FullName),
        Some("national_id") => conflict_error(ClientConflict::NationalId),
        Some("email") => conflict_error(ClientConflict::Email),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use chrono::{TimeDelta, TimeZone};

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn create_req(name: &str) -> ClientCreate {
        ClientCreate {
            full_name: name.to_string(),
            ..Default::default()
        }
    }

    fn rename(name: &str) -> ClientUpdate {
        ClientUpdate {
            full_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_input() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        let client = service
            .create(
                ClientCreate {
                    full_name: "  Zoé <b>Martin ".into(),
                    email: Some(" Zoe@Example.COM ".into()),
                    phone: Some("+33 (6) 12-34-56-78-99".into()),
                    national_id: Some("ab123".into()),
                    date_of_birth: Some("15/06/1990".into()),
                    ..Default::default()
                },
                day0(),
            )
            .await
            .unwrap();

        assert_eq!(client.full_name, "ZOÉ BMARTIN");
        assert_eq!(client.email.as_deref(), Some("zoe@example.com"));
        assert_eq!(client.phone.as_deref(), Some("336123456789"));
        assert_eq!(client.national_id.as_deref(), Some("AB123"));
        assert_eq!(client.date_of_birth.as_deref(), Some("1990-06-15"));
        assert_eq!(client.registration_date, day0().timestamp_millis());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_minors() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        service
            .create(
                ClientCreate {
                    national_id: Some("X1".into()),
                    ..create_req("Ana Silva")
                },
                day0(),
            )
            .await
            .unwrap();

        let err = service.create(create_req("ana silva"), day0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ClientNameExists);

        let err = service
            .create(
                ClientCreate {
                    national_id: Some("x1".into()),
                    ..create_req("Other Person")
                },
                day0(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ClientNationalIdExists);

        let err = service
            .create(
                ClientCreate {
                    date_of_birth: Some("2015-01-01".into()),
                    ..create_req("Young Person")
                },
                day0(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ClientTooYoung);

        let err = service.create(create_req("R2-D2"), day0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_rename_throttled_for_fifteen_days() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        let created = service.create(create_req("Ana"), day0() - TimeDelta::days(30)).await.unwrap();

        // Day 0: first rename, creation is 30 days old
        service.update(created.id, rename("Ana Maria"), day0()).await.unwrap();

        // Day 10: refused
        let err = service
            .update(created.id, rename("Ana Clara"), day0() + TimeDelta::days(10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NameChangeTooSoon);

        // Other fields still editable inside the window
        let updated = service
            .update(
                created.id,
                ClientUpdate {
                    notes: Some("front desk".into()),
                    ..Default::default()
                },
                day0() + TimeDelta::days(10),
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "ANA MARIA");

        // Day 16: allowed
        let renamed = service
            .update(created.id, rename("Ana Clara"), day0() + TimeDelta::days(16))
            .await
            .unwrap();
        assert_eq!(renamed.full_name, "ANA CLARA");
    }

    #[tokio::test]
    async fn test_rename_falls_back_to_snapshots() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        // Legacy client: snapshot history only, no changelog rows
        let legacy = client::insert(
            &db.pool,
            &NewClient {
                full_name: "LEGACY".into(),
                registration_date: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let snapshot = serde_json::json!({"full_name": "LEGACY"});
        history::insert_snapshot(
            &db.pool,
            EntityKind::Client,
            legacy.id,
            HistoryAction::Create,
            &snapshot,
            (day0() - TimeDelta::days(3)).timestamp_millis(),
        )
        .await
        .unwrap();

        let err = service.update(legacy.id, rename("Renamed"), day0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NameChangeTooSoon);
    }

    #[tokio::test]
    async fn test_rename_without_history_is_allowed() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        let bare = client::insert(
            &db.pool,
            &NewClient {
                full_name: "NO HISTORY".into(),
                registration_date: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let renamed = service.update(bare.id, rename("Has History"), day0()).await.unwrap();
        assert_eq!(renamed.full_name, "HAS HISTORY");
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = ClientService::new(&db.pool, &locks);

        let created = service.create(create_req("Gone Soon"), day0()).await.unwrap();
        let deleted = service.delete(created.id, day0()).await.unwrap();
        assert!(deleted.deleted_at.is_some());

        let err = service.delete(created.id, day0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ClientNotFound);
        let err = service.update(created.id, rename("Back"), day0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ClientNotFound);

        // Name is free again once the holder is soft-deleted
        service.create(create_req("Gone Soon"), day0()).await.unwrap();
    }
}
