use sticker_shared::Coordinate;

// Map surface
pub const MAP_ELEMENT_ID: &str = "map";
pub const DEFAULT_ORIGIN: Coordinate = Coordinate::new(40.7128, -74.0060); // New York
pub const DEFAULT_ZOOM: f64 = 12.0;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

// Page
pub const APP_ELEMENT_ID: &str = "sticker-app";
pub const STICKER_TITLE_ELEMENT_ID: &str = "sticker-title";
pub const STICKER_ID_ATTRIBUTE: &str = "data-sticker-id";

// Server routes
pub const API_STICKERS_PATH: &str = "/api/stickers";
pub const API_UPLOAD_PATH: &str = "/api/upload";
pub const STICKER_PAGE_PATH: &str = "/sticker";
pub const SIGHTING_IMAGE_PREFIX: &str = "/uploads/sightings";

// Reconciliation
pub const DEFAULT_FIT_PADDING: f64 = 0.1;
/// Span substituted for a zero-width axis before padding, so a lone point is not flush
/// against the viewport edge. Roughly 1.1 km of latitude.
pub const MIN_FIT_SPAN_DEGREES: f64 = 0.01;
pub const COORDINATE_DISPLAY_PRECISION: usize = 6;

pub const STATUS_DISMISS_MS: u32 = 5_000;
pub const UPLOAD_REDIRECT_DELAY_MS: u32 = 1_500;

/// Tunables for one sighting sync loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    pub fit_padding: f64,
    pub coordinate_precision: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fit_padding: DEFAULT_FIT_PADDING,
            coordinate_precision: COORDINATE_DISPLAY_PRECISION,
        }
    }
}
