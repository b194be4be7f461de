//! Promotion resolution

use chrono::{DateTime, Utc};
use shared::models::Promotion;

use super::{InapplicableReason, LedgerError};

/// Price and coverage length imposed by an applicable promotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPromotion {
    pub promotion_id: i64,
    /// Replaces any submitted amount
    pub amount: f64,
    /// Replaces the submitted period when present
    pub months: Option<u32>,
}

/// Whether `promotion` applies at `at`; window bounds are inclusive.
pub fn applicability(promotion: &Promotion, at: DateTime<Utc>) -> Result<(), InapplicableReason> {
    let at = at.timestamp_millis();
    if !promotion.active {
        return Err(InapplicableReason::Inactive);
    }
    if promotion.start_date.is_some_and(|start| at < start) {
        return Err(InapplicableReason::NotStarted);
    }
    if promotion.end_date.is_some_and(|end| at > end) {
        return Err(InapplicableReason::Ended);
    }
    Ok(())
}

/// Resolve the promotion referenced by a payment.
///
/// `requested` is the id from the request, `found` the row loaded for it.
/// No id means no override.
pub fn resolve_promotion(
    requested: Option<i64>,
    found: Option<&Promotion>,
    at: DateTime<Utc>,
) -> Result<Option<ResolvedPromotion>, LedgerError> {
    let Some(id) = requested else {
        return Ok(None);
    };
    let promotion = found
        .filter(|p| p.id == id)
        .ok_or(LedgerError::PromotionNotFound(id))?;

    applicability(promotion, at)
        .map_err(|reason| LedgerError::PromotionInapplicable { id, reason })?;

    let months = promotion
        .subscription_months
        .filter(|m| *m > 0)
        .and_then(|m| u32::try_from(m).ok());

    Ok(Some(ResolvedPromotion {
        promotion_id: id,
        amount: promotion.fixed_price,
        months,
    }))
}
