use chrono::{DateTime, Local, TimeZone, Utc};

/// Layout used for alert times in logs and `status` output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert fractional Unix seconds to a UTC datetime. Out-of-range values yield `None`.
pub fn datetime_from_unix(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

/// Format Unix seconds in the local timezone
pub fn format_timestamp(timestamp: f64) -> String {
    format_timestamp_in(timestamp, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(timestamp: f64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match datetime_from_unix(timestamp) {
        Some(dt) => dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => format!("{timestamp}"),
    }
}

/// Render a number of seconds as `29m 59s` style text
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).ceil() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_utc() {
        // 2024-03-15 14:30:00 UTC
        assert_eq!(
            format_timestamp_in(1710513000.0, &Utc),
            "2024-03-15 14:30:00"
        );
        assert_eq!(
            format_timestamp_in(1710513000.75, &Utc),
            "2024-03-15 14:30:00"
        );
    }

    #[test]
    fn test_datetime_from_unix_rejects_non_finite() {
        assert!(datetime_from_unix(f64::NAN).is_none());
        assert!(datetime_from_unix(f64::INFINITY).is_none());
        assert_eq!(datetime_from_unix(0.0).unwrap().timestamp(), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(42.2), "43s");
        assert_eq!(format_duration(1799.0), "29m 59s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
        assert_eq!(format_duration(-5.0), "0s");
    }
}
