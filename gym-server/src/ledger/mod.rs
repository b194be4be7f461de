//! Subscription & attendance ledger
//!
//! Pure date rules behind payments and check-ins. Nothing here touches the
//! database; callers load the rows, ask the ledger, then persist.
//!
//! - [`period`] - coverage end date from a period selector
//! - [`promotion`] - promotion applicability and price/length override
//! - [`interval`] - half-open coverage intervals and overlap detection
//! - [`name_throttle`] - one full-name change per 15 days
//! - [`attendance`] - once-per-UTC-day check-in gate

pub mod attendance;
mod error;
pub mod interval;
pub mod name_throttle;
pub mod period;
pub mod promotion;

pub use attendance::{CheckInContext, evaluate_check_in, utc_day_bounds};
pub use error::{InapplicableReason, LedgerError};
pub use interval::{CoverageInterval, ExistingCoverage, ensure_no_overlap};
pub use name_throttle::{NameSnapshot, check_name_change, last_change_from_snapshots};
pub use period::{PeriodSelector, add_months, end_of_coverage};
pub use promotion::{ResolvedPromotion, resolve_promotion};
