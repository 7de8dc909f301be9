use std::future::Future;

use serde::Serialize;
use sticker_shared::{ErrorBody, RecordId, StickerDetail, UploadResponse, WikiUpdate};
use thiserror::Error;

use crate::config::{API_STICKERS_PATH, API_UPLOAD_PATH, STICKER_PAGE_PATH};
use crate::status::StatusMessage;
use crate::sync::StickerSource;

pub const DEFAULT_STICKER_NAME: &str = "Unknown Sticker";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("fetch error: {0}")]
    Transport(String),
    #[error("sticker not found")]
    NotFound,
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
    #[error("parse error: {0}")]
    Decode(String),
}

impl NetworkError {
    /// `Error: <server message>` when the server explained itself, else `fallback`.
    pub fn user_text(&self, fallback: &str) -> String {
        match self {
            NetworkError::Status {
                message: Some(message),
                ..
            } => format!("Error: {message}"),
            NetworkError::NotFound => "Sticker not found".to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// What the server did with an uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    MatchedExisting {
        sticker_id: RecordId,
        sighting_id: Option<RecordId>,
    },
    CreatedSticker {
        sticker_id: RecordId,
        sighting_id: Option<RecordId>,
    },
}

impl UploadOutcome {
    pub fn sticker_id(&self) -> &RecordId {
        match self {
            UploadOutcome::MatchedExisting { sticker_id, .. }
            | UploadOutcome::CreatedSticker { sticker_id, .. } => sticker_id,
        }
    }

    pub fn redirect_path(&self) -> String {
        format!("{STICKER_PAGE_PATH}/{}", self.sticker_id())
    }

    pub fn status_message(&self) -> StatusMessage {
        match self {
            UploadOutcome::MatchedExisting { .. } => {
                StatusMessage::success("Matched existing sticker! Adding new sighting.")
            }
            UploadOutcome::CreatedSticker { .. } => StatusMessage::success("New sticker added!"),
        }
    }

    pub fn receipt(&self) -> UploadReceipt {
        UploadReceipt {
            message: self.status_message().text,
            redirect: self.redirect_path(),
        }
    }
}

/// Upload result handed back to the page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub message: String,
    pub redirect: String,
}

pub fn sticker_detail_path(id: &RecordId) -> String {
    format!("{API_STICKERS_PATH}/{}", path_segment(id))
}

pub fn wiki_path(id: &RecordId) -> String {
    format!("{API_STICKERS_PATH}/{}/wiki", path_segment(id))
}

fn path_segment(id: &RecordId) -> String {
    match id {
        RecordId::Int(value) => value.to_string(),
        RecordId::Text(text) => js_sys::encode_uri_component(text)
            .as_string()
            .unwrap_or_default(),
    }
}

pub fn or_default_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_STICKER_NAME
    } else {
        trimmed
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
}

fn status_error(status: u16, body: &str) -> NetworkError {
    if status == 404 {
        return NetworkError::NotFound;
    }
    NetworkError::Status {
        status,
        message: error_message(body),
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn interpret_detail(status: u16, body: &str) -> Result<StickerDetail, NetworkError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| NetworkError::Decode(e.to_string()))
}

pub fn interpret_upload(status: u16, body: &str) -> Result<UploadOutcome, NetworkError> {
    if !is_success(status) {
        return Err(NetworkError::Status {
            status,
            message: error_message(body),
        });
    }
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| NetworkError::Decode(e.to_string()))?;

    if response.match_found {
        let sticker_id = response
            .sticker
            .map(|s| s.id)
            .or(response.sticker_id)
            .ok_or_else(|| NetworkError::Decode("matched upload without sticker".into()))?;
        Ok(UploadOutcome::MatchedExisting {
            sticker_id,
            sighting_id: response.sighting_id,
        })
    } else {
        let sticker_id = response
            .sticker_id
            .ok_or_else(|| NetworkError::Decode("new sticker without sticker_id".into()))?;
        Ok(UploadOutcome::CreatedSticker {
            sticker_id,
            sighting_id: response.sighting_id,
        })
    }
}

pub fn interpret_wiki(status: u16, body: &str) -> Result<(), NetworkError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(status_error(status, body))
    }
}

async fn read_body(resp: &gloo_net::http::Response) -> Result<String, NetworkError> {
    resp.text()
        .await
        .map_err(|e| NetworkError::Decode(e.to_string()))
}

/// Fetch one sticker with its sightings and wiki metadata.
pub async fn fetch_sticker_detail(id: RecordId) -> Result<StickerDetail, NetworkError> {
    let resp = gloo_net::http::Request::get(&sticker_detail_path(&id))
        .send()
        .await
        .map_err(|e| NetworkError::Transport(e.to_string()))?;
    let body = read_body(&resp).await?;
    interpret_detail(resp.status(), &body)
}

pub async fn save_wiki(id: &RecordId, content: &str) -> Result<(), NetworkError> {
    let payload = WikiUpdate {
        content: content.to_string(),
    };
    let resp = gloo_net::http::Request::post(&wiki_path(id))
        .json(&payload)
        .map_err(|e| NetworkError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| NetworkError::Transport(e.to_string()))?;
    let body = read_body(&resp).await?;
    interpret_wiki(resp.status(), &body)
}

/// Multipart upload of a sticker photo with its location.
pub async fn upload_sighting(
    file: &web_sys::File,
    latitude: f64,
    longitude: f64,
    name: &str,
    description: &str,
) -> Result<UploadOutcome, NetworkError> {
    let js_err = |e: wasm_bindgen::JsValue| NetworkError::Transport(format!("{e:?}"));
    let form = web_sys::FormData::new().map_err(js_err)?;
    form.append_with_blob("file", file).map_err(js_err)?;
    form.append_with_str("latitude", &latitude.to_string())
        .map_err(js_err)?;
    form.append_with_str("longitude", &longitude.to_string())
        .map_err(js_err)?;
    form.append_with_str("name", or_default_name(name))
        .map_err(js_err)?;
    form.append_with_str("description", description.trim())
        .map_err(js_err)?;

    let resp = gloo_net::http::Request::post(API_UPLOAD_PATH)
        .body(form)
        .map_err(|e| NetworkError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| NetworkError::Transport(e.to_string()))?;
    let body = read_body(&resp).await?;
    interpret_upload(resp.status(), &body)
}

/// The live server, reached through the browser's fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpStickerSource;

impl StickerSource for HttpStickerSource {
    fn fetch_detail(
        &self,
        sticker_id: &RecordId,
    ) -> impl Future<Output = Result<StickerDetail, NetworkError>> {
        fetch_sticker_detail(sticker_id.clone())
    }
}
