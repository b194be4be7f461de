//! Full-name change throttle

use chrono::{DateTime, TimeDelta, Utc};

use super::LedgerError;

/// Minimum spacing between two full-name changes (15 days)
pub fn cooldown() -> TimeDelta {
    TimeDelta::hours(360)
}

/// Full name recorded by one history snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSnapshot {
    pub full_name: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Derive the last name change from snapshot history (newest first).
///
/// The most recent snapshot whose name differs from the one just before it
/// wins. Without such a pair, the newest snapshot counts if it carries the
/// current name. Snapshots without a name are skipped in comparisons.
pub fn last_change_from_snapshots(
    snapshots: &[NameSnapshot],
    current_name: &str,
) -> Option<DateTime<Utc>> {
    let changed = snapshots.windows(2).find_map(|pair| {
        match (pair[0].full_name.as_deref(), pair[1].full_name.as_deref()) {
            (Some(newer), Some(older)) if newer != older => Some(pair[0].recorded_at),
            _ => None,
        }
    });

    changed.or_else(|| {
        snapshots
            .first()
            .filter(|s| s.full_name.as_deref() == Some(current_name))
            .map(|s| s.recorded_at)
    })
}

/// Allow or reject renaming `current` to `proposed` at `now`.
///
/// Unchanged names always pass, as does a client with no recorded change.
pub fn check_name_change(
    current: &str,
    proposed: &str,
    last_change: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), LedgerError> {
    if current == proposed {
        return Ok(());
    }
    let Some(last_change) = last_change else {
        return Ok(());
    };

    let allowed_from = last_change
        .checked_add_signed(cooldown())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    if now < allowed_from {
        return Err(LedgerError::RateLimited {
            last_change,
            allowed_from,
        });
    }
    Ok(())
}
