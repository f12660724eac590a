// src/core/timestamp.rs - Timestamp serde for persisted documents
//
// Written as RFC 3339 UTC. Read as RFC 3339, or as a naive ISO-8601 string
// (no offset) interpreted in local time, which is what older run files hold.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| Some(Utc.from_utc_datetime(&naive)))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2026-02-21T10:30:00Z").unwrap();
        assert_eq!(dt.year(), 2026);
        assert_eq!(dt.to_rfc3339(), "2026-02-21T10:30:00+00:00");
    }

    #[test]
    fn test_parse_offset_normalises_to_utc() {
        let dt = parse("2026-02-21T12:30:00+02:00").unwrap();
        assert_eq!(dt, parse("2026-02-21T10:30:00Z").unwrap());
    }

    #[test]
    fn test_parse_naive_iso() {
        assert!(parse("2024-11-03T14:05:09.123456").is_some());
        assert!(parse("2024-11-03T14:05:09").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
    }
}
