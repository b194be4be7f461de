use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Why a promotion cannot be applied at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InapplicableReason {
    Inactive,
    NotStarted,
    Ended,
}

impl InapplicableReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::NotStarted => "not_started",
            Self::Ended => "ended",
        }
    }
}

/// Ledger rule violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Promotion {0} not found")]
    PromotionNotFound(i64),

    #[error("Promotion {id} is not applicable ({})", .reason.as_str())]
    PromotionInapplicable { id: i64, reason: InapplicableReason },

    #[error("Coverage overlaps payment {payment_id} [{start}, {end})")]
    OverlapConflict {
        payment_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Full name was changed at {last_change}; next change allowed from {allowed_from}")]
    RateLimited {
        last_change: DateTime<Utc>,
        allowed_from: DateTime<Utc>,
    },

    #[error("Client {0} not found")]
    ClientNotFound(i64),

    #[error("Client {client_id} already checked in on {day}")]
    DuplicateCheckIn { client_id: i64, day: NaiveDate },

    #[error("Client {client_id} has no current payment")]
    PaymentNotCurrent {
        client_id: i64,
        coverage_end: Option<DateTime<Utc>>,
    },
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::PromotionNotFound(id) => {
                AppError::with_message(ErrorCode::PromotionNotFound, message)
                    .with_detail("promotion_id", id)
            }
            LedgerError::PromotionInapplicable { id, reason } => {
                AppError::with_message(ErrorCode::PromotionInapplicable, message)
                    .with_detail("promotion_id", id)
                    .with_detail("reason", reason.as_str())
            }
            LedgerError::OverlapConflict {
                payment_id,
                start,
                end,
            } => AppError::with_message(ErrorCode::PaymentOverlap, message)
                .with_detail("payment_id", payment_id)
                .with_detail("payment_date", start.timestamp_millis())
                .with_detail("next_payment_date", end.timestamp_millis()),
            LedgerError::RateLimited {
                last_change,
                allowed_from,
            } => AppError::with_message(ErrorCode::NameChangeTooSoon, message)
                .with_detail("last_change_at", last_change.timestamp_millis())
                .with_detail("allowed_from", allowed_from.timestamp_millis()),
            LedgerError::ClientNotFound(id) => {
                AppError::with_message(ErrorCode::ClientNotFound, message)
                    .with_detail("client_id", id)
            }
            LedgerError::DuplicateCheckIn { client_id, day } => {
                AppError::with_message(ErrorCode::DuplicateCheckIn, message)
                    .with_detail("client_id", client_id)
                    .with_detail("day", day.to_string())
            }
            LedgerError::PaymentNotCurrent {
                client_id,
                coverage_end,
            } => AppError::with_message(ErrorCode::PaymentNotCurrent, message)
                .with_detail("client_id", client_id)
                .with_detail(
                    "coverage_end",
                    coverage_end.map_or(json!(null), |end| json!(end.timestamp_millis())),
                ),
        }
    }
}
