//! Half-open coverage intervals

use chrono::{DateTime, Utc};

use super::LedgerError;

/// `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CoverageInterval {
    /// `None` unless `end > start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &CoverageInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// A stored payment's interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingCoverage {
    pub payment_id: i64,
    pub interval: CoverageInterval,
}

/// Reject `proposed` if it overlaps any existing interval.
///
/// Reports the earliest-starting collision.
pub fn ensure_no_overlap<I>(proposed: &CoverageInterval, existing: I) -> Result<(), LedgerError>
where
    I: IntoIterator<Item = ExistingCoverage>,
{
    let conflict = existing
        .into_iter()
        .filter(|e| e.interval.overlaps(proposed))
        .min_by_key(|e| (e.interval.start, e.payment_id));

    match conflict {
        Some(e) => Err(LedgerError::OverlapConflict {
            payment_id: e.payment_id,
            start: e.interval.start,
            end: e.interval.end,
        }),
        None => Ok(()),
    }
}
