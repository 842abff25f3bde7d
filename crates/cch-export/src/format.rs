//! Shared text formatting for rendered output.

use chrono::{DateTime, TimeDelta, Utc};

/// Second-precision UTC timestamp, e.g. `2024-01-01T10:00:00Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Calendar date, e.g. `2024-01-01`.
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Human duration with second precision: `45s`, `2m 5s`, `1h 0m 5s`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "0s");
        assert_eq!(format_duration(TimeDelta::seconds(45)), "45s");
        assert_eq!(format_duration(TimeDelta::seconds(125)), "2m 5s");
        assert_eq!(format_duration(TimeDelta::seconds(3605)), "1h 0m 5s");
        assert_eq!(format_duration(TimeDelta::milliseconds(1500)), "1s");
        assert_eq!(format_duration(TimeDelta::seconds(-10)), "0s");
    }

    #[test]
    fn test_format_timestamp_truncates_subseconds() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap() + TimeDelta::milliseconds(250);
        assert_eq!(format_timestamp(ts), "2024-01-01T10:00:05Z");
        assert_eq!(format_date(ts), "2024-01-01");
    }
}
