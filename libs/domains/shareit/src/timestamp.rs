//! Lenient timestamp input.
//!
//! Clients send either RFC 3339 (`2100-01-01T00:00:00Z`) or a local
//! timestamp without offset (`2100-01-01T00:00:00`); the latter is read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("invalid timestamp '{}'", raw))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accepts_both_forms() {
        let expected = Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse("2100-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse("2100-01-01T03:00:00+03:00").unwrap(), expected);
        assert_eq!(parse("2100-01-01T00:00:00").unwrap(), expected);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("tomorrow").is_err());
    }
}
