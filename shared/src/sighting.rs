use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// Opaque record identity. The server issues integer row ids; string tokens are accepted too.
/// The wire representation is preserved so ids re-serialize unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an id from untyped text such as a `data-*` attribute.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(match token.parse::<i64>() {
            Ok(value) => RecordId::Int(value),
            Err(_) => RecordId::Text(token.to_string()),
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(value) => write!(f, "{value}"),
            RecordId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// A coordinate as it arrives from the server: normally a JSON number, occasionally a
/// numeric string from form-encoded uploads. Anything else lands in `Other` so the row is
/// still decoded and can be rejected by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// A wire field of type `T`, or whatever JSON value arrived in its place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Expected(T),
    Other(serde_json::Value),
}

impl<T> Lenient<T> {
    pub fn as_expected(&self) -> Option<&T> {
        match self {
            Lenient::Expected(value) => Some(value),
            Lenient::Other(_) => None,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Lenient::Expected(value)
    }
}

/// One sighting row exactly as served by `GET /api/stickers/{id}`.
/// Every field is optional here; validation happens client-side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SightingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Lenient<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<RawNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<RawNumber>,
    #[serde(default, alias = "spottedAt", skip_serializing_if = "Option::is_none")]
    pub spotted_at: Option<Lenient<String>>,
}

/// WGS84 position in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A validated sighting.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    pub id: RecordId,
    pub coordinate: Coordinate,
    pub spotted_at: Timestamp,
}

impl Sighting {
    /// Re-serializable wire form of this sighting.
    pub fn to_record(&self) -> SightingRecord {
        SightingRecord {
            id: Some(Lenient::Expected(self.id.clone())),
            latitude: Some(RawNumber::Number(self.coordinate.lat)),
            longitude: Some(RawNumber::Number(self.coordinate.lon)),
            spotted_at: Some(Lenient::Expected(self.spotted_at.as_str().to_string())),
        }
    }
}
