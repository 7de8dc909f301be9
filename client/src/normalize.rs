use std::collections::HashSet;
use std::fmt;

use sticker_shared::{
    Coordinate, Lenient, RawNumber, RecordId, Sighting, SightingRecord, StickerDetail, Timestamp,
};
use thiserror::Error;

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    Missing,
    NotANumber(String),
    InvalidId(String),
    OutOfRange(f64),
    BadTimestamp(String),
    Duplicate(RecordId),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => f.write_str("is missing"),
            Problem::NotANumber(text) => write!(f, "is not a number: {text:?}"),
            Problem::InvalidId(text) => write!(f, "is not a valid id: {text}"),
            Problem::OutOfRange(value) => write!(f, "is out of range: {value}"),
            Problem::BadTimestamp(text) => write!(f, "is not a valid timestamp: {text:?}"),
            Problem::Duplicate(id) => write!(f, "repeats id {id}"),
        }
    }
}

/// A malformed record. Names the offending field, and for sightings the record index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("sighting #{index}: {field} {problem}")]
    Sighting {
        index: usize,
        field: &'static str,
        problem: Problem,
    },
    #[error("sticker {field} {problem}")]
    Sticker {
        field: &'static str,
        problem: Problem,
    },
}

/// A sticker detail response with every field the sync loop reads validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDetail {
    pub sticker_id: RecordId,
    pub sightings: Vec<Sighting>,
    pub created_at: Timestamp,
    pub wiki_updated_at: Option<Timestamp>,
}

/// Validate raw sighting rows, keeping server order.
///
/// The first invalid record fails the whole list; nothing is dropped silently.
pub fn normalize(records: &[SightingRecord]) -> Result<Vec<Sighting>, ValidationError> {
    let mut seen: HashSet<&RecordId> = HashSet::with_capacity(records.len());
    let mut sightings = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let reject = |field: &'static str, problem: Problem| ValidationError::Sighting {
            index,
            field,
            problem,
        };

        let id = match record.id.as_ref() {
            None => return Err(reject("id", Problem::Missing)),
            Some(Lenient::Expected(id)) => id,
            Some(Lenient::Other(value)) => {
                return Err(reject("id", Problem::InvalidId(value.to_string())));
            }
        };
        if !seen.insert(id) {
            return Err(reject("id", Problem::Duplicate(id.clone())));
        }

        let lat = coerce_degrees(record.latitude.as_ref(), LATITUDE_LIMIT)
            .map_err(|problem| reject("latitude", problem))?;
        let lon = coerce_degrees(record.longitude.as_ref(), LONGITUDE_LIMIT)
            .map_err(|problem| reject("longitude", problem))?;
        let spotted_at = parse_spotted_at(record.spotted_at.as_ref())
            .map_err(|problem| reject("spotted_at", problem))?;

        sightings.push(Sighting {
            id: id.clone(),
            coordinate: Coordinate::new(lat, lon),
            spotted_at,
        });
    }

    Ok(sightings)
}

/// Validate a full detail response: sightings plus the sticker and wiki timestamps.
pub fn normalize_detail(detail: &StickerDetail) -> Result<NormalizedDetail, ValidationError> {
    let sightings = normalize(&detail.sightings)?;

    let created_at = parse_timestamp(Some(detail.sticker.created_at.as_str())).map_err(|problem| {
        ValidationError::Sticker {
            field: "created_at",
            problem,
        }
    })?;

    let wiki_updated_at = detail
        .wiki_content
        .as_ref()
        .map(|wiki| parse_timestamp(Some(wiki.updated_at.as_str())))
        .transpose()
        .map_err(|problem| ValidationError::Sticker {
            field: "wiki_content.updated_at",
            problem,
        })?;

    Ok(NormalizedDetail {
        sticker_id: detail.sticker.id.clone(),
        sightings,
        created_at,
        wiki_updated_at,
    })
}

fn coerce_degrees(raw: Option<&RawNumber>, limit: f64) -> Result<f64, Problem> {
    let value = match raw {
        None => return Err(Problem::Missing),
        Some(RawNumber::Number(value)) => *value,
        Some(RawNumber::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Problem::NotANumber(text.clone()))?,
        Some(RawNumber::Other(value)) => return Err(Problem::NotANumber(value.to_string())),
    };
    if !value.is_finite() {
        return Err(Problem::NotANumber(value.to_string()));
    }
    if !(-limit..=limit).contains(&value) {
        return Err(Problem::OutOfRange(value));
    }
    Ok(value)
}

fn parse_spotted_at(raw: Option<&Lenient<String>>) -> Result<Timestamp, Problem> {
    match raw {
        Some(Lenient::Other(value)) => Err(Problem::BadTimestamp(value.to_string())),
        Some(Lenient::Expected(text)) => parse_timestamp(Some(text.as_str())),
        None => parse_timestamp(None),
    }
}

fn parse_timestamp(raw: Option<&str>) -> Result<Timestamp, Problem> {
    let raw = raw.ok_or(Problem::Missing)?;
    if raw.trim().is_empty() {
        return Err(Problem::Missing);
    }
    Timestamp::parse(raw).map_err(|_| Problem::BadTimestamp(raw.to_string()))
}
