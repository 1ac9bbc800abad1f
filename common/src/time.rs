//! Calendar-date utilities and constants for the PTAX feed.

use chrono::NaiveDate;

use crate::error::{ParseError, ParseResult};

/// Feed timing and lookback constants.
pub mod constants {
    use chrono::Duration;

    /// Public location of the daily PTAX closing files.
    pub const DEFAULT_BASE_URL: &str = "https://www4.bcb.gov.br/Download/fechamento";

    /// Days attempted, including the start date, before giving up.
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    /// Per-attempt network timeout (10 seconds).
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    /// Lifetime of a resolved rate set in the cache, in seconds.
    pub const CACHE_TTL_SECS: u64 = 300;

    /// Lifetime of a resolved rate set in the cache (5 minutes).
    pub fn cache_ttl() -> Duration {
        Duration::seconds(CACHE_TTL_SECS as i64)
    }
}

/// Format a date as `YYYYMMDD`, the feed's path segment.
pub fn format_date_for_url(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Format a date as `YYYY-MM-DD`, used for cache keys.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a feed date in `DD/MM/YYYY` form.
pub fn parse_feed_date(s: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y")
        .map_err(|_| ParseError::InvalidDate(s.to_string()))
}

/// Format a date in the feed's zero-padded `DD/MM/YYYY` form.
pub fn format_feed_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// The calendar day before `date`, `None` at the minimum representable date.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}
