use serde::{Deserialize, Serialize};

use crate::sighting::{RecordId, SightingRecord};

/// Canonical sticker metadata. Timestamps stay as text until the client validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
}

/// Wiki page attached to a sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiContent {
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
}

/// Response of `GET /api/stickers/{id}`. Sightings arrive in server order (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerDetail {
    pub sticker: Sticker,
    #[serde(default)]
    pub sightings: Vec<SightingRecord>,
    #[serde(default, alias = "wikiContent")]
    pub wiki_content: Option<WikiContent>,
}

/// Body of `POST /api/stickers/{id}/wiki`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiUpdate {
    pub content: String,
}

/// `{error}` body carried by non-2xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::StickerDetail;
    use crate::sighting::RecordId;

    #[test]
    fn detail_parses_server_payload() {
        let json = r##"{
            "sticker": {"id": 1, "name": "Blue cat", "description": null, "created_at": "2024-01-01T09:00:00"},
            "sightings": [
                {"id": 2, "latitude": 40.1, "longitude": -74.1, "spotted_at": "2024-01-05T10:00:00"},
                {"id": 1, "latitude": 40.0, "longitude": -74.0, "spotted_at": "2024-01-01T09:00:00"}
            ],
            "wiki_content": {"id": 4, "sticker_id": 1, "content": "# Blue cat", "updated_at": "2024-02-01T12:00:00"}
        }"##;
        let detail: StickerDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.sticker.id, RecordId::Int(1));
        assert_eq!(detail.sticker.name.as_deref(), Some("Blue cat"));
        assert_eq!(detail.sticker.description, None);
        assert_eq!(detail.sightings.len(), 2);
        let wiki = detail.wiki_content.unwrap();
        assert_eq!(wiki.updated_at, "2024-02-01T12:00:00");
    }

    #[test]
    fn detail_without_wiki_or_sightings() {
        let json = r#"{"sticker": {"id": 9, "createdAt": "2024-01-01"}, "wiki_content": null}"#;
        let detail: StickerDetail = serde_json::from_str(json).unwrap();
        assert!(detail.sightings.is_empty());
        assert!(detail.wiki_content.is_none());
        assert_eq!(detail.sticker.created_at, "2024-01-01");
    }
}
