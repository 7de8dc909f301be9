use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Naive layouts emitted by Python's `isoformat()` and by SQLite `CURRENT_TIMESTAMP`.
/// `%.f` also matches an absent fractional part.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized timestamp {0:?}")]
pub struct TimestampParseError(pub String);

/// A server-issued point in time.
///
/// Keeps the text it was parsed from so a value re-serializes exactly as it arrived.
/// Naive date-times carry no offset on the wire and are read as UTC; bare dates are
/// midnight UTC. Ordering is chronological.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self, TimestampParseError> {
        let instant =
            parse_instant(raw.trim()).ok_or_else(|| TimestampParseError(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            instant,
        })
    }

    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339(),
            instant,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_bare_date_as_utc_midnight() {
        let ts = Timestamp::parse("2024-01-05").unwrap();
        assert_eq!(ts.instant(), Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_python_isoformat_with_micros() {
        let ts = Timestamp::parse("2024-03-09T14:22:05.123456").unwrap();
        assert_eq!(ts.instant().timestamp(), 1_709_994_125);
        assert_eq!(ts.instant().timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn parses_sqlite_space_separated() {
        let ts = Timestamp::parse("2024-03-09 14:22:05").unwrap();
        assert_eq!(
            ts.instant(),
            Utc.with_ymd_and_hms(2024, 3, 9, 14, 22, 5).unwrap()
        );
    }

    #[test]
    fn parses_rfc3339_offset() {
        let ts = Timestamp::parse("2024-03-09T16:22:05+02:00").unwrap();
        assert_eq!(
            ts.instant(),
            Utc.with_ymd_and_hms(2024, 3, 9, 14, 22, 5).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("2024-13-01").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn orders_chronologically_not_lexically() {
        let offset = Timestamp::parse("2024-01-02T01:00:00+05:00").unwrap();
        let naive = Timestamp::parse("2024-01-01T23:00:00").unwrap();
        assert!(offset < naive);
    }

    #[test]
    fn serializes_wire_text() {
        let ts = Timestamp::parse("2024-01-05").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-01-05\"");
        let back: Timestamp = serde_json::from_str("\"2024-01-05\"").unwrap();
        assert_eq!(back, ts);
    }
}
