//! Timestamp and id helpers
//!
//! Every instant crossing the API or hitting the database is Unix millis (UTC).

use chrono::{DateTime, TimeZone, Utc};

/// Current UTC time in Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Unix millis -> `DateTime<Utc>`
///
/// Out-of-range values clamp to chrono's representable bounds.
pub fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt,
        None if millis < 0 => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Generate a time-ordered i64 id for entity rows.
///
/// Layout (53 bits, safe as a JavaScript number):
///   - 41 bits: milliseconds since 2024-01-01 UTC
///   - 12 bits: random
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000);
    (ts << 12) | rand_bits
}
