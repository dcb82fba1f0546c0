//! Epoch-millisecond timestamps.
//!
//! The catalog stores every instant as integer milliseconds since the Unix
//! epoch. Converting through floating-point seconds loses precision for
//! large values, so the conversion splits the count into whole seconds and a
//! millisecond remainder and adds them separately.

use chrono::{DateTime, TimeDelta, Utc};

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: i64 = 1000;

/// Convert epoch milliseconds into a UTC instant.
///
/// Uses floor division, so the remainder is always in `0..1000` and
/// instants before 1970 resolve correctly. Returns `None` if the value lies
/// outside the range `chrono` can represent.
pub fn epoch_millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    let seconds = millis.div_euclid(MILLIS_PER_SECOND);
    let remainder = millis.checked_sub(seconds.checked_mul(MILLIS_PER_SECOND)?)?;
    let whole = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    whole.checked_add_signed(TimeDelta::try_milliseconds(remainder)?)
}
