use std::fmt::Write;

use sticker_shared::{Coordinate, Timestamp};

/// Calendar date of a timestamp (UTC), e.g. `2024-01-05`.
pub fn format_date(ts: &Timestamp) -> String {
    ts.instant().format("%Y-%m-%d").to_string()
}

/// `lat, lon` rounded to `precision` decimals. Display only.
pub fn format_coordinate(coordinate: Coordinate, precision: usize) -> String {
    let mut out = String::with_capacity(24);
    write_coordinate(&mut out, coordinate, precision);
    out
}

pub fn write_coordinate(buf: &mut String, coordinate: Coordinate, precision: usize) {
    buf.clear();
    let _ = write!(
        buf,
        "{:.*}, {:.*}",
        precision, coordinate.lat, precision, coordinate.lon
    );
}

/// Popup text bound to a sighting marker.
pub fn spotted_label(ts: &Timestamp) -> String {
    format!("Spotted: {}", format_date(ts))
}
