//! Display helpers for byte counts and server timestamps.

use chrono::{DateTime, Utc};

use crate::model::Created;

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human readable size using 1024-based units. Zero renders as `N/A`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "N/A".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value, decimals), UNITS[unit])
}

/// Sum of Mbps rates, two decimals.
pub fn format_mbps(rate: f64) -> String {
    format!("{rate:.2} Mbps")
}

fn trim_decimals(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// RFC 3339 timestamp; blank or unparsable input gives `None`.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => "N/A".to_string(),
        Some(s) => match parse_timestamp(Some(s)) {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "Invalid Date".to_string(),
        },
    }
}

/// Coarse relative age, e.g. `3 minutes ago`.
pub fn time_since(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(created) = parse_timestamp(raw) else {
        return "N/A".to_string();
    };

    let seconds = (now - created).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let (n, unit) = if days > 0 {
        (days, "day")
    } else if hours > 0 {
        (hours, "hour")
    } else if minutes > 0 {
        (minutes, "minute")
    } else {
        (seconds, "second")
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} ago")
}

/// Elapsed time as `{h}h {m}m {s}s`.
pub fn format_elapsed(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(created) = parse_timestamp(raw) else {
        return "N/A".to_string();
    };
    let total = (now - created).num_seconds().max(0);
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

fn created_ms<T: Created>(item: &T) -> Option<i64> {
    parse_timestamp(item.created()).map(|t| t.timestamp_millis())
}

/// Item with the latest `created`. Items without one sort first; ties keep
/// the earlier item.
pub fn most_recent<T: Created>(items: &[T]) -> Option<&T> {
    items.iter().fold(None, |best: Option<&T>, item| match best {
        None => Some(item),
        Some(b) => {
            let cur = created_ms(item).unwrap_or(i64::MIN);
            if cur > created_ms(b).unwrap_or(i64::MIN) {
                Some(item)
            } else {
                Some(b)
            }
        }
    })
}

/// Item with the earliest `created`. Items without one sort last.
pub fn oldest<T: Created>(items: &[T]) -> Option<&T> {
    items.iter().fold(None, |best: Option<&T>, item| match best {
        None => Some(item),
        Some(b) => {
            let cur = created_ms(item).unwrap_or(i64::MAX);
            if cur < created_ms(b).unwrap_or(i64::MAX) {
                Some(item)
            } else {
                Some(b)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RtmpConn;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(0, 2), "N/A");
        assert_eq!(format_bytes(10, 2), "10 B");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 1024 * 300, 2), "5.29 MB");
    }

    #[test]
    fn mbps_two_decimals() {
        assert_eq!(format_mbps(1.5), "1.50 Mbps");
        assert_eq!(format_mbps(0.0), "0.00 Mbps");
    }

    #[test]
    fn relative_age() {
        let now = at("2024-05-02T12:00:00Z");
        assert_eq!(time_since(Some("2024-05-02T11:59:59Z"), now), "1 second ago");
        assert_eq!(time_since(Some("2024-05-02T11:57:00Z"), now), "3 minutes ago");
        assert_eq!(time_since(Some("2024-05-02T11:00:00Z"), now), "1 hour ago");
        assert_eq!(time_since(Some("2024-04-30T12:00:00Z"), now), "2 days ago");
        assert_eq!(time_since(None, now), "N/A");
        assert_eq!(time_since(Some("yesterday"), now), "N/A");
    }

    #[test]
    fn elapsed() {
        let now = at("2024-05-02T12:00:00Z");
        assert_eq!(format_elapsed(Some("2024-05-02T10:58:55Z"), now), "1h 1m 5s");
    }

    #[test]
    fn timestamp() {
        assert_eq!(
            format_timestamp(Some("2024-05-02T10:58:55.123+02:00")),
            "2024-05-02 08:58:55"
        );
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some("nope")), "Invalid Date");
    }

    #[test]
    fn recent_and_oldest() {
        let conn = |id: &str, created: Option<&str>| RtmpConn {
            id: id.into(),
            created: created.map(String::from),
            ..Default::default()
        };
        let items = vec![
            conn("a", Some("2024-05-02T10:00:00Z")),
            conn("b", None),
            conn("c", Some("2024-05-02T11:00:00Z")),
        ];
        assert_eq!(most_recent(&items).map(|c| c.id.as_str()), Some("c"));
        assert_eq!(oldest(&items).map(|c| c.id.as_str()), Some("a"));
        assert!(most_recent::<RtmpConn>(&[]).is_none());
    }
}
