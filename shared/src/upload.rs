use serde::{Deserialize, Serialize};

use crate::sighting::RecordId;
use crate::sticker::Sticker;

/// Successful response of `POST /api/upload`.
///
/// A matched upload carries the existing `sticker`; a new one carries only `sticker_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, alias = "matchFound")]
    pub match_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
    #[serde(default, alias = "stickerId", skip_serializing_if = "Option::is_none")]
    pub sticker_id: Option<RecordId>,
    #[serde(default, alias = "sightingId", skip_serializing_if = "Option::is_none")]
    pub sighting_id: Option<RecordId>,
}
