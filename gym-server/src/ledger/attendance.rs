//! Check-in gate

use chrono::{DateTime, Days, NaiveTime, Utc};

use super::LedgerError;

/// `[00:00, next 00:00)` of the UTC day containing `at`
pub fn utc_day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Facts loaded by the caller before asking the gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckInContext {
    pub client_exists: bool,
    /// Id of a check-in already recorded on the same UTC day
    pub existing_today: Option<i64>,
    /// End of the client's latest non-deleted payment
    pub latest_coverage_end: Option<DateTime<Utc>>,
}

/// Decide whether `client_id` may check in at `at`.
///
/// Checks run in order: client exists, not yet checked in today, coverage
/// still running (`at < next_payment_date`).
pub fn evaluate_check_in(
    client_id: i64,
    at: DateTime<Utc>,
    ctx: &CheckInContext,
) -> Result<(), LedgerError> {
    if !ctx.client_exists {
        return Err(LedgerError::ClientNotFound(client_id));
    }
    if ctx.existing_today.is_some() {
        return Err(LedgerError::DuplicateCheckIn {
            client_id,
            day: at.date_naive(),
        });
    }
    match ctx.latest_coverage_end {
        Some(end) if at < end => Ok(()),
        coverage_end => Err(LedgerError::PaymentNotCurrent {
            client_id,
            coverage_end,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn paid_until(end: DateTime<Utc>) -> CheckInContext {
        CheckInContext {
            client_exists: true,
            existing_today: None,
            latest_coverage_end: Some(end),
        }
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = utc_day_bounds(at(2024, 3, 5, 18, 45));
        assert_eq!(start, at(2024, 3, 5, 0, 0));
        assert_eq!(end, at(2024, 3, 6, 0, 0));

        let (start, _) = utc_day_bounds(at(2024, 3, 5, 0, 0));
        assert_eq!(start, at(2024, 3, 5, 0, 0));
    }

    #[test]
    fn test_current_coverage_admits() {
        let ctx = paid_until(at(2024, 4, 1, 0, 0));
        assert!(evaluate_check_in(1, at(2024, 3, 5, 9, 0), &ctx).is_ok());
    }

    #[test]
    fn test_second_check_in_same_day_rejected() {
        let ctx = CheckInContext {
            existing_today: Some(40),
            ..paid_until(at(2024, 4, 1, 0, 0))
        };
        assert_eq!(
            evaluate_check_in(1, at(2024, 3, 5, 18, 0), &ctx),
            Err(LedgerError::DuplicateCheckIn {
                client_id: 1,
                day: at(2024, 3, 5, 0, 0).date_naive(),
            })
        );
    }

    #[test]
    fn test_coverage_end_is_exclusive() {
        let end = at(2024, 4, 1, 0, 0);
        let ctx = paid_until(end);
        assert_eq!(
            evaluate_check_in(1, end, &ctx),
            Err(LedgerError::PaymentNotCurrent {
                client_id: 1,
                coverage_end: Some(end),
            })
        );
    }

    #[test]
    fn test_never_paid() {
        let ctx = CheckInContext {
            client_exists: true,
            ..Default::default()
        };
        assert_eq!(
            evaluate_check_in(2, at(2024, 3, 5, 9, 0), &ctx),
            Err(LedgerError::PaymentNotCurrent {
                client_id: 2,
                coverage_end: None,
            })
        );
    }

    #[test]
    fn test_gate_order() {
        // unknown client wins over everything else
        let ctx = CheckInContext {
            client_exists: false,
            existing_today: Some(1),
            latest_coverage_end: None,
        };
        assert_eq!(
            evaluate_check_in(3, at(2024, 3, 5, 9, 0), &ctx),
            Err(LedgerError::ClientNotFound(3))
        );

        // duplicate reported before lapsed coverage
        let ctx = CheckInContext {
            client_exists: true,
            existing_today: Some(1),
            latest_coverage_end: None,
        };
        assert!(matches!(
            evaluate_check_in(3, at(2024, 3, 5, 9, 0), &ctx),
            Err(LedgerError::DuplicateCheckIn { .. })
        ));
    }
}
