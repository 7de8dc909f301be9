use sticker_shared::{Coordinate, RecordId, Sighting, Timestamp};

use crate::config::SIGHTING_IMAGE_PREFIX;
use crate::time_format::{format_coordinate, format_date};

/// One render-ready row of the sightings list.
///
/// `spotted_at` and `coordinate` are the exact validated values; the `*_label` fields are
/// rounded copies for display and are never read back.
#[derive(Debug, Clone, PartialEq)]
pub struct SightingSummary {
    pub id: RecordId,
    pub spotted_at: Timestamp,
    pub coordinate: Coordinate,
    pub spotted_label: String,
    pub location_label: String,
    pub image_url: String,
}

/// Project sightings into list rows, keeping the delivery order of the server.
pub fn project(sightings: &[Sighting], precision: usize) -> Vec<SightingSummary> {
    sightings
        .iter()
        .map(|s| SightingSummary {
            id: s.id.clone(),
            spotted_at: s.spotted_at.clone(),
            coordinate: s.coordinate,
            spotted_label: format_date(&s.spotted_at),
            location_label: format_coordinate(s.coordinate, precision),
            image_url: sighting_image_url(&s.id),
        })
        .collect()
}

pub fn sighting_image_url(id: &RecordId) -> String {
    format!("{SIGHTING_IMAGE_PREFIX}/{id}_sighting.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sighting(id: i64, lat: f64, lon: f64, spotted_at: &str) -> Sighting {
        Sighting {
            id: RecordId::Int(id),
            coordinate: Coordinate::new(lat, lon),
            spotted_at: Timestamp::parse(spotted_at).unwrap(),
        }
    }

    #[test]
    fn keeps_delivery_order_not_chronological() {
        let rows = project(
            &[
                sighting(2, 40.1, -74.1, "2024-01-05"),
                sighting(1, 40.0, -74.0, "2024-01-01"),
                sighting(3, 40.2, -74.2, "2024-01-09"),
            ],
            6,
        );
        let ids: Vec<_> = rows.iter().map(|r| r.id.clone()).collect();
        assert_eq!(
            ids,
            vec![RecordId::Int(2), RecordId::Int(1), RecordId::Int(3)]
        );
    }

    #[test]
    fn labels_are_rounded_but_values_exact() {
        let exact = Coordinate::new(40.712_812_345_6, -74.006_015_987_6);
        let rows = project(
            &[Sighting {
                id: RecordId::Int(8),
                coordinate: exact,
                spotted_at: Timestamp::parse("2024-01-05T10:11:12").unwrap(),
            }],
            6,
        );
        let row = &rows[0];
        assert_eq!(row.location_label, "40.712812, -74.006016");
        assert_eq!(row.spotted_label, "2024-01-05");
        assert_eq!(row.coordinate, exact);
        assert_eq!(row.spotted_at.as_str(), "2024-01-05T10:11:12");
    }

    #[test]
    fn image_url_uses_sighting_id() {
        assert_eq!(
            sighting_image_url(&RecordId::Int(31)),
            "/uploads/sightings/31_sighting.jpg"
        );
    }

    #[test]
    fn empty_projects_empty() {
        assert!(project(&[], 6).is_empty());
    }
}
