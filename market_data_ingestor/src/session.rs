//! Trading-session dates.
//!
//! Providers stamp daily bars in UTC, but a US session that opens at 09:30
//! New York time can land on either side of UTC midnight depending on the
//! provider's convention. Every bar therefore carries the session date as seen
//! from the exchange's own time zone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Exchange time zone used when a provider does not report one.
pub const DEFAULT_EXCHANGE_TZ: Tz = chrono_tz::America::New_York;

/// Resolves an IANA time-zone name, falling back to [`DEFAULT_EXCHANGE_TZ`].
pub fn exchange_tz(name: Option<&str>) -> Tz {
    name.and_then(|n| n.parse::<Tz>().ok())
        .unwrap_or(DEFAULT_EXCHANGE_TZ)
}

/// The session date a UTC bar timestamp belongs to in `tz`.
pub fn session_date(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDate {
    timestamp.with_timezone(&tz).date_naive()
}
