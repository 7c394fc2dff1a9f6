//! Time utilities: timezone-aware parsing and display.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a user-entered datetime, returning UTC.
///
/// Accepts RFC 3339 ("2026-08-05T17:00:00Z") or a local time like
/// "2026-08-05 17:00" interpreted in the given IANA timezone.
pub fn parse_user_datetime(input: &str, tz: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;

    let ndt = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .map_err(|e| anyhow::anyhow!("invalid datetime '{input}': {e} (use RFC 3339 or YYYY-MM-DD HH:MM)"))?;

    let local = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {input} {tz}"))?;

    Ok(local.with_timezone(&Utc))
}

/// Format a UTC time for display in the given timezone; falls back to UTC
/// when the timezone string is unusable.
pub fn format_local(dt: DateTime<Utc>, tz: &str) -> String {
    match tz.parse::<Tz>() {
        Ok(tz) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        Err(_) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chicago_local_time() {
        // Feb is CST (UTC-6)
        let utc = parse_user_datetime("2026-02-20 23:59", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn parses_rfc3339_regardless_of_tz() {
        let utc = parse_user_datetime("2026-08-05T17:00:00Z", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-08-05T17:00:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_user_datetime("next tuesday", "America/Chicago").is_err());
        assert!(parse_user_datetime("2026-02-20 23:59", "Mars/Olympus").is_err());
    }
}
