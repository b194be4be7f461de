//! Promotion writes

use chrono::{DateTime, Utc};
use shared::models::{EntityKind, HistoryAction, Promotion, PromotionCreate, PromotionUpdate};
use sqlx::SqlitePool;

use crate::audit;
use crate::db::repository::RepoError;
use crate::db::repository::promotion::{self, NewPromotion, PromotionChanges};
use crate::utils::time::parse_optional_instant;
use crate::utils::validation::{self, MAX_NOTE_LEN, MAX_PROMOTION_NAME_LEN};
use crate::utils::{AppError, AppResult, ErrorCode};

pub struct PromotionService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PromotionService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: PromotionCreate, now: DateTime<Utc>) -> AppResult<Promotion> {
        let start_date = millis(parse_optional_instant("start_date", req.start_date.as_deref())?);
        let end_date = millis(parse_optional_instant("end_date", req.end_date.as_deref())?);
        check_window(start_date, end_date)?;

        let data = NewPromotion {
            name: validation::required_text("name", Some(req.name.as_str()), MAX_PROMOTION_NAME_LEN)?,
            fixed_price: checked_price(req.fixed_price)?,
            subscription_months: checked_months(req.subscription_months)?,
            active: req.active.unwrap_or(true),
            start_date,
            end_date,
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?,
        };

        let created = promotion::insert(self.pool, &data).await?;
        tracing::info!(promotion_id = created.id, name = %created.name, "Promotion created");

        audit::record(
            self.pool,
            EntityKind::Promotion,
            created.id,
            HistoryAction::Create,
            None,
            &created,
            now.timestamp_millis(),
        )
        .await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        req: PromotionUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Promotion> {
        let changes = PromotionChanges {
            name: validation::optional_text("name", req.name.as_deref(), MAX_PROMOTION_NAME_LEN)?,
            fixed_price: req.fixed_price.map(checked_price).transpose()?,
            subscription_months: checked_months(req.subscription_months)?,
            active: req.active,
            start_date: millis(parse_optional_instant("start_date", req.start_date.as_deref())?),
            end_date: millis(parse_optional_instant("end_date", req.end_date.as_deref())?),
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_NOTE_LEN)?,
        };

        let current = promotion::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| promotion_not_found(id))?;
        check_window(
            changes.start_date.or(current.start_date),
            changes.end_date.or(current.end_date),
        )?;

        let updated = promotion::update(self.pool, id, &changes)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => promotion_not_found(id),
                other => other.into(),
            })?;
        tracing::info!(promotion_id = id, active = updated.active, "Promotion updated");

        audit::record(
            self.pool,
            EntityKind::Promotion,
            id,
            HistoryAction::Update,
            Some(&current),
            &updated,
            now.timestamp_millis(),
        )
        .await;
        Ok(updated)
    }
}

pub(crate) fn promotion_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PromotionNotFound, format!("Promotion {id} not found"))
        .with_detail("promotion_id", id)
}

fn millis(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(|dt| dt.timestamp_millis())
}

fn checked_price(price: f64) -> AppResult<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::invalid_field(
            "fixed_price",
            format!("fixed_price must be zero or more, got {price}"),
        ));
    }
    Ok(price)
}

fn checked_months(months: Option<i64>) -> AppResult<Option<i64>> {
    match months {
        Some(m) if m <= 0 => Err(AppError::invalid_field(
            "subscription_months",
            "subscription_months must be a positive number of months",
        )),
        other => Ok(other),
    }
}

fn check_window(start: Option<i64>, end: Option<i64>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::invalid_field(
                "end_date",
                "end_date must not be before start_date",
            ));
        }
    }
    Ok(())
}
