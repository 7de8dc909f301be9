use sticker_shared::{Sighting, Timestamp};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("first-spotted date requested for an empty sighting set")]
pub struct EmptySetError;

/// Quick facts shown beside the map.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFacts {
    pub first_spotted: Timestamp,
    pub sighting_count: usize,
    pub last_updated: Timestamp,
}

impl SummaryFacts {
    /// Facts for a sticker whose sighting set is empty: first spotted falls back to the
    /// sticker's own creation time.
    pub fn without_sightings(created_at: &Timestamp, wiki_updated_at: Option<&Timestamp>) -> Self {
        Self {
            first_spotted: created_at.clone(),
            sighting_count: 0,
            last_updated: last_updated(created_at, wiki_updated_at).clone(),
        }
    }
}

/// Chronologically earliest sighting time, whatever order the list arrived in.
/// Ties resolve to the first in input order.
pub fn first_spotted(sightings: &[Sighting]) -> Result<&Timestamp, EmptySetError> {
    sightings
        .iter()
        .map(|s| &s.spotted_at)
        .min_by_key(|ts| ts.instant())
        .ok_or(EmptySetError)
}

/// Wiki edits are the freshest signal; otherwise the sticker's creation time.
pub fn last_updated<'a>(
    created_at: &'a Timestamp,
    wiki_updated_at: Option<&'a Timestamp>,
) -> &'a Timestamp {
    wiki_updated_at.unwrap_or(created_at)
}

pub fn derive(
    sightings: &[Sighting],
    created_at: &Timestamp,
    wiki_updated_at: Option<&Timestamp>,
) -> Result<SummaryFacts, EmptySetError> {
    Ok(SummaryFacts {
        first_spotted: first_spotted(sightings)?.clone(),
        sighting_count: sightings.len(),
        last_updated: last_updated(created_at, wiki_updated_at).clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_shared::{Coordinate, RecordId};

    fn sighting(id: i64, spotted_at: &str) -> Sighting {
        Sighting {
            id: RecordId::Int(id),
            coordinate: Coordinate::new(40.0, -74.0),
            spotted_at: Timestamp::parse(spotted_at).unwrap(),
        }
    }

    fn ts(text: &str) -> Timestamp {
        Timestamp::parse(text).unwrap()
    }

    #[test]
    fn first_spotted_is_true_minimum_for_reverse_chronological_input() {
        let newest_first = [
            sighting(4, "2024-03-01"),
            sighting(3, "2024-02-01"),
            sighting(2, "2024-01-15"),
            sighting(1, "2024-01-01"),
        ];
        assert_eq!(first_spotted(&newest_first).unwrap().as_str(), "2024-01-01");
    }

    #[test]
    fn first_spotted_ignores_position() {
        let shuffled = [
            sighting(2, "2024-01-15T12:00:00"),
            sighting(1, "2023-12-31T23:59:59"),
            sighting(3, "2024-02-01T00:00:00"),
        ];
        assert_eq!(
            first_spotted(&shuffled).unwrap().as_str(),
            "2023-12-31T23:59:59"
        );
    }

    #[test]
    fn first_spotted_compares_instants_across_formats() {
        let mixed = [
            sighting(1, "2024-01-01T03:00:00+05:00"),
            sighting(2, "2023-12-31T23:00:00"),
        ];
        assert_eq!(
            first_spotted(&mixed).unwrap().as_str(),
            "2024-01-01T03:00:00+05:00"
        );
    }

    #[test]
    fn empty_set_is_an_error() {
        assert_eq!(first_spotted(&[]), Err(EmptySetError));
        assert_eq!(derive(&[], &ts("2024-01-01"), None), Err(EmptySetError));
    }

    #[test]
    fn scenario_two_sightings() {
        let facts = derive(
            &[sighting(1, "2024-01-05"), sighting(2, "2024-01-01")],
            &ts("2023-12-25T00:00:00"),
            None,
        )
        .unwrap();
        assert_eq!(facts.first_spotted.as_str(), "2024-01-01");
        assert_eq!(facts.sighting_count, 2);
        assert_eq!(facts.last_updated.as_str(), "2023-12-25T00:00:00");
    }

    #[test]
    fn last_updated_prefers_wiki() {
        let created = ts("2024-01-01");
        let wiki = ts("2024-02-10T09:30:00");
        assert_eq!(last_updated(&created, Some(&wiki)), &wiki);
        assert_eq!(last_updated(&created, None), &created);
    }

    #[test]
    fn without_sightings_falls_back_to_creation() {
        let created = ts("2024-01-01");
        let wiki = ts("2024-02-10");
        let facts = SummaryFacts::without_sightings(&created, Some(&wiki));
        assert_eq!(facts.first_spotted, created);
        assert_eq!(facts.sighting_count, 0);
        assert_eq!(facts.last_updated, wiki);
    }
}
