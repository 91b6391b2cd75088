//! Timestamp parsing for steering-gap computation.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Parse an RFC3339 timestamp into unix milliseconds.
///
/// Returns `None` for empty or malformed input; callers treat an
/// unparseable timestamp as an absent sample, never as an error.
pub fn parse_ms(ts: &str) -> Option<i64> {
    if ts.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(ts, &Rfc3339).ok()?;
    Some((parsed.unix_timestamp_nanos() / 1_000_000) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ms_rfc3339() {
        assert_eq!(parse_ms("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(parse_ms("1970-01-01T00:00:01.5Z"), Some(1500));
    }

    #[test]
    fn parse_ms_rejects_garbage() {
        assert_eq!(parse_ms(""), None);
        assert_eq!(parse_ms("not-a-time"), None);
    }
}
