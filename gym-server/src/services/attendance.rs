//! Check-in writes

use chrono::{DateTime, Utc};
use shared::models::{Attendance, AttendanceCreate};
use shared::util::millis_to_utc;
use sqlx::SqlitePool;

use super::ClientLocks;
use crate::db;
use crate::db::repository::{RepoError, attendance, client, payment};
use crate::ledger::{self, CheckInContext};
use crate::utils::time::parse_optional_instant;
use crate::utils::{AppError, AppResult, ErrorCode};

pub struct AttendanceService<'a> {
    pool: &'a SqlitePool,
    locks: &'a ClientLocks,
}

impl<'a> AttendanceService<'a> {
    pub fn new(pool: &'a SqlitePool, locks: &'a ClientLocks) -> Self {
        Self { pool, locks }
    }

    /// Record a check-in at `req.time` (default `now`).
    ///
    /// The same-day lookup, the payment lookup and the insert share one
    /// transaction under the client's lock.
    pub async fn check_in(&self, req: AttendanceCreate, now: DateTime<Utc>) -> AppResult<Attendance> {
        let at = parse_optional_instant("time", req.time.as_deref())?.unwrap_or(now);
        let (day_start, day_end) = ledger::utc_day_bounds(at);

        let _guard = self.locks.acquire(req.client_id).await;
        let mut tx = db::begin_write(self.pool).await?;

        let client_exists = client::find_active_by_id(&mut *tx, req.client_id)
            .await?
            .is_some();
        let existing_today = attendance::find_for_client_between(
            &mut *tx,
            req.client_id,
            day_start.timestamp_millis(),
            day_end.timestamp_millis(),
        )
        .await?;
        let latest_coverage_end = payment::latest_for_client(&mut *tx, req.client_id)
            .await?
            .map(|p| millis_to_utc(p.next_payment_date));

        let ctx = CheckInContext {
            client_exists,
            existing_today,
            latest_coverage_end,
        };
        ledger::evaluate_check_in(req.client_id, at, &ctx).inspect_err(|e| {
            tracing::info!(client_id = req.client_id, error = %e, "Check-in refused");
        })?;

        let created = attendance::insert(&mut *tx, req.client_id, at.timestamp_millis()).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            attendance_id = created.id,
            client_id = created.client_id,
            "Check-in recorded"
        );
        Ok(created)
    }

    /// Hard delete, no business rule
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !attendance::delete(self.pool, id).await? {
            return Err(AppError::with_message(
                ErrorCode::AttendanceNotFound,
                format!("Attendance {id} not found"),
            ));
        }
        tracing::info!(attendance_id = id, "Check-in deleted");
        Ok(())
    }
}
