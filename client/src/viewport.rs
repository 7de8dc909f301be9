use sticker_shared::Coordinate;

use crate::config::MIN_FIT_SPAN_DEGREES;

const MAX_LAT: f64 = 90.0;
const MAX_LON: f64 = 180.0;

/// South-west / north-east corners of a map region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl ViewportBounds {
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    pub fn lon_span(&self) -> f64 {
        self.north_east.lon - self.south_west.lon
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&point.lon)
    }
}

/// Fit a padded region around `points`.
///
/// Returns `None` for an empty set; the caller keeps its current view. Each side is pushed
/// out by `padding_fraction` of the span on its axis. A zero span (one point, or points on a
/// line) is widened to `MIN_FIT_SPAN_DEGREES` first so the padding is never zero.
/// Min/max folds make the result independent of input order.
pub fn fit(points: &[Coordinate], padding_fraction: f64) -> Option<ViewportBounds> {
    let first = points.first()?;
    let (mut min_lat, mut max_lat) = (first.lat, first.lat);
    let (mut min_lon, mut max_lon) = (first.lon, first.lon);
    for p in &points[1..] {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    let (min_lat, max_lat) = pad_axis(min_lat, max_lat, padding_fraction, MAX_LAT);
    let (min_lon, max_lon) = pad_axis(min_lon, max_lon, padding_fraction, MAX_LON);

    Some(ViewportBounds {
        south_west: Coordinate::new(min_lat, min_lon),
        north_east: Coordinate::new(max_lat, max_lon),
    })
}

fn pad_axis(min: f64, max: f64, padding_fraction: f64, limit: f64) -> (f64, f64) {
    let (min, max) = if max - min > 0.0 {
        (min, max)
    } else {
        let half = MIN_FIT_SPAN_DEGREES / 2.0;
        (min - half, max + half)
    };
    let pad = (max - min) * padding_fraction.max(0.0);
    ((min - pad).max(-limit), (max + pad).min(limit))
}
