//! Payment lifecycle
//!
//! ```text
//! create: client → promotion (at payment_date) → end date → amount/period
//!         → overlap → insert → client.subscription_period → history
//! ```
//!
//! The overlap read and the insert run under the client's lock inside one
//! transaction, so two submissions for the same client cannot both pass.

use chrono::{DateTime, Utc};
use shared::models::{EntityKind, HistoryAction, Payment, PaymentCreate, PaymentUpdate};
use shared::util::millis_to_utc;
use sqlx::SqlitePool;

use super::ClientLocks;
use crate::audit;
use crate::db;
use crate::db::repository::payment::{self, NewPayment, PaymentChanges};
use crate::db::repository::{RepoError, client, promotion};
use crate::ledger::{
    self, CoverageInterval, ExistingCoverage, LedgerError, PeriodSelector, ResolvedPromotion,
};
use crate::utils::time::{parse_instant, parse_optional_instant};
use crate::utils::validation::{self, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Upper bound for an explicit month count
pub const MAX_CUSTOM_MONTHS: u32 = 120;

pub struct PaymentService<'a> {
    pool: &'a SqlitePool,
    locks: &'a ClientLocks,
}

impl<'a> PaymentService<'a> {
    pub fn new(pool: &'a SqlitePool, locks: &'a ClientLocks) -> Self {
        Self { pool, locks }
    }

    pub async fn create(&self, req: PaymentCreate, now: DateTime<Utc>) -> AppResult<Payment> {
        let notes = validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?;
        let requested = requested_selector(&req)?;
        let start = parse_optional_instant("payment_date", req.payment_date.as_deref())?
            .unwrap_or(now);
        let explicit_end =
            parse_optional_instant("next_payment_date", req.next_payment_date.as_deref())?;

        let _guard = self.locks.acquire(req.client_id).await;
        let mut tx = db::begin_write(self.pool).await?;

        client::find_active_by_id(&mut *tx, req.client_id)
            .await?
            .ok_or(LedgerError::ClientNotFound(req.client_id))?;

        let found = match req.promotion_id {
            Some(id) => promotion::find_by_id(&mut *tx, id).await?,
            None => None,
        };
        let resolved = ledger::resolve_promotion(req.promotion_id, found.as_ref(), start)?;

        let (selector, end) = coverage_end(requested, resolved, start, explicit_end)?;
        let amount = resolved.map(|p| p.amount).or(req.amount);
        let amount = checked_amount(amount)?;
        let interval = checked_interval(start, end)?;

        let existing = payment::find_overlapping(
            &mut *tx,
            req.client_id,
            start.timestamp_millis(),
            end.timestamp_millis(),
            None,
        )
        .await?;
        ledger::ensure_no_overlap(&interval, coverages(&existing))
            .inspect_err(|e| tracing::info!(client_id = req.client_id, error = %e, "Payment refused"))?;

        let created = payment::insert(
            &mut *tx,
            &NewPayment {
                client_id: req.client_id,
                promotion_id: resolved.map(|p| p.promotion_id),
                amount,
                period: selector.payment_period(),
                months: selector.months().map(i64::from),
                payment_date: start.timestamp_millis(),
                next_payment_date: end.timestamp_millis(),
                notes,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            payment_id = created.id,
            client_id = created.client_id,
            amount = created.amount,
            period = ?created.period,
            "Payment recorded"
        );

        if let Some(period) = selector.payment_period().subscription_period() {
            if let Err(e) = client::set_subscription_period(self.pool, req.client_id, period).await {
                tracing::warn!(client_id = req.client_id, error = %e, "Client subscription period not updated");
            }
        }

        audit::record(
            self.pool,
            EntityKind::Payment,
            created.id,
            HistoryAction::Create,
            None,
            &created,
            now.timestamp_millis(),
        )
        .await;
        Ok(created)
    }

    /// Partial update. Changing the client or the dates re-checks overlap
    /// against the client's other payments.
    pub async fn update(&self, id: i64, req: PaymentUpdate, now: DateTime<Utc>) -> AppResult<Payment> {
        let notes = validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?;
        let amount = req.amount.map(|a| checked_amount(Some(a))).transpose()?;
        let new_start = parse_optional_instant("payment_date", req.payment_date.as_deref())?;
        let new_end = req
            .next_payment_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|raw| parse_instant("next_payment_date", raw))
            .transpose()?;

        // The owner and the destination are both locked. The owner is
        // confirmed inside the transaction; if another update moved the
        // payment meanwhile, lock the new owner and read again.
        let (_guards, mut tx, current) = loop {
            let seen = payment::find_by_id(self.pool, id)
                .await?
                .ok_or_else(|| payment_not_found(id))?;
            let destination = req.client_id.unwrap_or(seen.client_id);
            let guards = self.locks.acquire_all(&[seen.client_id, destination]).await;

            let mut tx = db::begin_write(self.pool).await?;
            let current = payment::find_by_id(&mut *tx, id)
                .await?
                .ok_or_else(|| payment_not_found(id))?;
            if current.client_id == seen.client_id {
                break (guards, tx, current);
            }
            tracing::debug!(payment_id = id, "Payment changed owner while waiting, retrying");
        };
        let client_id = req.client_id.unwrap_or(current.client_id);
        if client_id != current.client_id {
            client::find_active_by_id(&mut *tx, client_id)
                .await?
                .ok_or(LedgerError::ClientNotFound(client_id))?;
        }

        let start = new_start.unwrap_or_else(|| millis_to_utc(current.payment_date));
        let selector = req.subscription_period.map(PeriodSelector::from);
        let end = match (new_end, selector) {
            (Some(end), _) => end,
            (None, Some(selector)) => ledger::end_of_coverage(start, selector),
            (None, None) => millis_to_utc(current.next_payment_date),
        };
        let interval = checked_interval(start, end)?;

        let coverage_moved = client_id != current.client_id
            || interval.start.timestamp_millis() != current.payment_date
            || interval.end.timestamp_millis() != current.next_payment_date;
        if coverage_moved {
            let existing = payment::find_overlapping(
                &mut *tx,
                client_id,
                start.timestamp_millis(),
                end.timestamp_millis(),
                Some(id),
            )
            .await?;
            ledger::ensure_no_overlap(&interval, coverages(&existing))?;
        }

        let changes = PaymentChanges {
            client_id: req.client_id,
            amount,
            period: selector.map(PeriodSelector::payment_period),
            months: selector.and_then(PeriodSelector::months).map(i64::from),
            payment_date: new_start.map(|dt| dt.timestamp_millis()),
            next_payment_date: coverage_moved.then(|| end.timestamp_millis()),
            notes,
        };
        let updated = payment::update(&mut *tx, id, &changes)
            .await
            .map_err(|e| not_found_as(e, id))?;
        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(payment_id = id, "Payment updated");

        audit::record(
            self.pool,
            EntityKind::Payment,
            id,
            HistoryAction::Update,
            Some(&current),
            &updated,
            now.timestamp_millis(),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, now: DateTime<Utc>) -> AppResult<Payment> {
        let current = payment::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| payment_not_found(id))?;
        let deleted = payment::soft_delete(self.pool, id)
            .await
            .map_err(|e| not_found_as(e, id))?;
        tracing::info!(payment_id = id, client_id = deleted.client_id, "Payment deleted");

        audit::record(
            self.pool,
            EntityKind::Payment,
            id,
            HistoryAction::Delete,
            Some(&current),
            &deleted,
            now.timestamp_millis(),
        )
        .await;
        Ok(deleted)
    }
}

/// The selector named by the request, if any; naming several is an error.
fn requested_selector(req: &PaymentCreate) -> AppResult<Option<PeriodSelector>> {
    let mut selectors = Vec::with_capacity(1);
    if let Some(period) = req.subscription_period {
        selectors.push(PeriodSelector::from(period));
    }
    if let Some(months) = req.months {
        if !(1..=MAX_CUSTOM_MONTHS).contains(&months) {
            return Err(AppError::with_message(
                ErrorCode::InvalidPeriod,
                format!("months must be between 1 and {MAX_CUSTOM_MONTHS}"),
            )
            .with_detail("months", months));
        }
        selectors.push(PeriodSelector::Months(months));
    }
    if req.day_pass {
        selectors.push(PeriodSelector::DayPass);
    }

    match selectors.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        _ => Err(AppError::with_message(
            ErrorCode::InvalidPeriod,
            "Choose only one of subscription_period, months or day_pass",
        )),
    }
}

/// Effective selector and coverage end.
///
/// Promotion months beat everything; otherwise an explicit end date beats
/// the computed one. Without promotion months a selector is required.
fn coverage_end(
    requested: Option<PeriodSelector>,
    promotion: Option<ResolvedPromotion>,
    start: DateTime<Utc>,
    explicit_end: Option<DateTime<Utc>>,
) -> AppResult<(PeriodSelector, DateTime<Utc>)> {
    if let Some(months) = promotion.and_then(|p| p.months) {
        let selector = PeriodSelector::Months(months);
        return Ok((selector, ledger::end_of_coverage(start, selector)));
    }
    let selector = requested.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InvalidPeriod,
            "One of subscription_period, months or day_pass is required",
        )
    })?;
    let end = explicit_end.unwrap_or_else(|| ledger::end_of_coverage(start, selector));
    Ok((selector, end))
}

fn checked_amount(amount: Option<f64>) -> AppResult<f64> {
    match amount {
        Some(a) if a.is_finite() && a > 0.0 => Ok(a),
        Some(a) => Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("Amount must be a positive number, got {a}"),
        )),
        None => Err(AppError::with_message(ErrorCode::InvalidAmount, "Amount is required")),
    }
}

fn checked_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<CoverageInterval> {
    CoverageInterval::new(start, end).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InvalidPeriod,
            "next_payment_date must be after payment_date",
        )
        .with_detail("payment_date", start.timestamp_millis())
        .with_detail("next_payment_date", end.timestamp_millis())
    })
}

fn coverages(payments: &[Payment]) -> impl Iterator<Item = ExistingCoverage> + '_ {
    payments.iter().filter_map(|p| {
        CoverageInterval::new(millis_to_utc(p.payment_date), millis_to_utc(p.next_payment_date))
            .map(|interval| ExistingCoverage {
                payment_id: p.id,
                interval,
            })
    })
}

pub(crate) fn payment_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PaymentNotFound, format!("Payment {id} not found"))
        .with_detail("payment_id", id)
}

fn not_found_as(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => payment_not_found(id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::client::NewClient;
    use crate::db::repository::promotion::NewPromotion;
    use chrono::TimeZone;
    use shared::models::{PaymentPeriod, SubscriptionPeriod};

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    async fn seed_client(db: &DbService, name: &str) -> i64 {
        client::insert(
            &db.pool,
            &NewClient {
                full_name: name.into(),
                registration_date: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    fn monthly(client_id: i64, start: &str) -> PaymentCreate {
        PaymentCreate {
            client_id,
            subscription_period: Some(SubscriptionPeriod::Monthly),
            amount: Some(50.0),
            payment_date: Some(start.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_monthly_updates_client_period() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;

        let created = service
            .create(monthly(client_id, "2024-01-31"), utc(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(created.period, PaymentPeriod::Monthly);
        assert_eq!(created.months, Some(1));
        assert_eq!(created.next_payment_date, utc(2024, 2, 29).timestamp_millis());

        let stored = client::find_by_id(&db.pool, client_id).await.unwrap().unwrap();
        assert_eq!(stored.subscription_period, Some(SubscriptionPeriod::Monthly));
    }

    #[tokio::test]
    async fn test_overlapping_payment_rejected() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;

        let first = service
            .create(monthly(client_id, "2024-01-01"), utc(2024, 1, 1))
            .await
            .unwrap();

        let err = service
            .create(monthly(client_id, "2024-01-15"), utc(2024, 1, 15))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentOverlap);
        assert_eq!(err.details.unwrap()["payment_id"], first.id);

        // Back-to-back coverage is fine
        service
            .create(monthly(client_id, "2024-02-01"), utc(2024, 2, 1))
            .await
            .unwrap();

        // Another client is unaffected
        let other = seed_client(&db, "BEA").await;
        service
            .create(monthly(other, "2024-01-15"), utc(2024, 1, 15))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_promotion_overrides_amount_and_length() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;
        let promo = promotion::insert(
            &db.pool,
            &NewPromotion {
                name: "Spring".into(),
                fixed_price: 300.0,
                subscription_months: Some(3),
                active: true,
                start_date: Some(utc(2024, 1, 1).timestamp_millis()),
                end_date: Some(utc(2024, 6, 30).timestamp_millis()),
                notes: None,
            },
        )
        .await
        .unwrap();

        let created = service
            .create(
                PaymentCreate {
                    promotion_id: Some(promo.id),
                    amount: Some(1.0),
                    ..monthly(client_id, "2024-03-01")
                },
                utc(2024, 3, 1),
            )
            .await
            .unwrap();

        assert_eq!(created.amount, 300.0);
        assert_eq!(created.promotion_id, Some(promo.id));
        assert_eq!(created.period, PaymentPeriod::Custom);
        assert_eq!(created.next_payment_date, utc(2024, 6, 1).timestamp_millis());

        let err = service
            .create(
                PaymentCreate {
                    promotion_id: Some(promo.id),
                    ..monthly(client_id, "2024-07-01")
                },
                utc(2024, 7, 1),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PromotionInapplicable);

        let err = service
            .create(
                PaymentCreate {
                    promotion_id: Some(promo.id + 1),
                    ..monthly(client_id, "2024-08-01")
                },
                utc(2024, 8, 1),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PromotionNotFound);
    }

    #[tokio::test]
    async fn test_selector_and_amount_validation() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;
        let now = utc(2024, 1, 1);

        let none = PaymentCreate {
            subscription_period: None,
            ..monthly(client_id, "2024-01-01")
        };
        assert_eq!(service.create(none, now).await.unwrap_err().code, ErrorCode::InvalidPeriod);

        let two = PaymentCreate {
            day_pass: true,
            ..monthly(client_id, "2024-01-01")
        };
        assert_eq!(service.create(two, now).await.unwrap_err().code, ErrorCode::InvalidPeriod);

        let too_long = PaymentCreate {
            subscription_period: None,
            months: Some(121),
            ..monthly(client_id, "2024-01-01")
        };
        assert_eq!(
            service.create(too_long, now).await.unwrap_err().code,
            ErrorCode::InvalidPeriod
        );

        let free = PaymentCreate {
            amount: Some(0.0),
            ..monthly(client_id, "2024-01-01")
        };
        assert_eq!(service.create(free, now).await.unwrap_err().code, ErrorCode::InvalidAmount);

        let backwards = PaymentCreate {
            next_payment_date: Some("2023-12-01".into()),
            ..monthly(client_id, "2024-01-01")
        };
        assert_eq!(
            service.create(backwards, now).await.unwrap_err().code,
            ErrorCode::InvalidPeriod
        );

        let missing_client = monthly(client_id + 1, "2024-01-01");
        assert_eq!(
            service.create(missing_client, now).await.unwrap_err().code,
            ErrorCode::ClientNotFound
        );

        // Nothing was written by any rejected request
        assert!(payment::find_by_client(&db.pool, client_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_day_pass_and_custom_months() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;

        let pass = service
            .create(
                PaymentCreate {
                    subscription_period: None,
                    day_pass: true,
                    amount: Some(8.0),
                    ..monthly(client_id, "2024-05-10T18:00:00Z")
                },
                utc(2024, 5, 10),
            )
            .await
            .unwrap();
        assert_eq!(pass.period, PaymentPeriod::DayPass);
        assert_eq!(pass.months, None);
        assert_eq!(
            pass.next_payment_date - pass.payment_date,
            chrono::TimeDelta::days(1).num_milliseconds()
        );

        let custom = service
            .create(
                PaymentCreate {
                    subscription_period: None,
                    months: Some(6),
                    ..monthly(client_id, "2024-06-01")
                },
                utc(2024, 6, 1),
            )
            .await
            .unwrap();
        assert_eq!(custom.period, PaymentPeriod::Custom);
        assert_eq!(custom.next_payment_date, utc(2024, 12, 1).timestamp_millis());

        // Custom periods leave the client's subscription period alone
        let stored = client::find_by_id(&db.pool, client_id).await.unwrap().unwrap();
        assert_eq!(stored.subscription_period, None);
    }

    #[tokio::test]
    async fn test_update_rechecks_overlap() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;

        let jan = service
            .create(monthly(client_id, "2024-01-01"), utc(2024, 1, 1))
            .await
            .unwrap();
        let mar = service
            .create(monthly(client_id, "2024-03-01"), utc(2024, 3, 1))
            .await
            .unwrap();

        // Stretching March back into January collides
        let err = service
            .update(
                mar.id,
                PaymentUpdate {
                    payment_date: Some("2024-01-20".into()),
                    ..Default::default()
                },
                utc(2024, 3, 2),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentOverlap);
        assert_eq!(err.details.unwrap()["payment_id"], jan.id);

        // Moving within its own slot is fine (itself excluded)
        let moved = service
            .update(
                mar.id,
                PaymentUpdate {
                    payment_date: Some("2024-02-15".into()),
                    subscription_period: Some(SubscriptionPeriod::Monthly),
                    amount: Some(55.0),
                    ..Default::default()
                },
                utc(2024, 3, 2),
            )
            .await
            .unwrap();
        assert_eq!(moved.payment_date, utc(2024, 2, 15).timestamp_millis());
        assert_eq!(moved.next_payment_date, utc(2024, 3, 15).timestamp_millis());
        assert_eq!(moved.amount, 55.0);

        let err = service
            .update(
                jan.id,
                PaymentUpdate {
                    amount: Some(-1.0),
                    ..Default::default()
                },
                utc(2024, 3, 2),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAmount);
    }

    #[tokio::test]
    async fn test_delete_frees_the_interval() {
        let db = DbService::in_memory().await.unwrap();
        let locks = ClientLocks::new();
        let service = PaymentService::new(&db.pool, &locks);
        let client_id = seed_client(&db, "ANA").await;

        let jan = service
            .create(monthly(client_id, "2024-01-01"), utc(2024, 1, 1))
            .await
            .unwrap();
        service.delete(jan.id, utc(2024, 1, 2)).await.unwrap();

        let err = service.delete(jan.id, utc(2024, 1, 2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotFound);

        service
            .create(monthly(client_id, "2024-01-15"), utc(2024, 1, 15))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_moving_a_payment_waits_for_its_owner() {
        let db = DbService::in_memory().await.unwrap();
        let locks = std::sync::Arc::new(ClientLocks::new());
        let ana = seed_client(&db, "ANA").await;
        let bea = seed_client(&db, "BEA").await;
        let jan = PaymentService::new(&db.pool, &locks)
            .create(monthly(ana, "2024-01-01"), utc(2024, 1, 1))
            .await
            .unwrap();

        let owner = locks.acquire(ana).await;
        let mover = {
            let pool = db.pool.clone();
            let locks = locks.clone();
            tokio::spawn(async move {
                PaymentService::new(&pool, &locks)
                    .update(
                        jan.id,
                        PaymentUpdate {
                            client_id: Some(bea),
                            ..Default::default()
                        },
                        utc(2024, 1, 2),
                    )
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!mover.is_finished());

        drop(owner);
        let moved = mover.await.unwrap().unwrap();
        assert_eq!(moved.client_id, bea);

        // The destination's coverage is checked too
        let service = PaymentService::new(&db.pool, &locks);
        let second = service
            .create(monthly(ana, "2024-01-10"), utc(2024, 1, 10))
            .await
            .unwrap();
        let err = service
            .update(
                second.id,
                PaymentUpdate {
                    client_id: Some(bea),
                    ..Default::default()
                },
                utc(2024, 1, 10),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentOverlap);
    }
}
