use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use sticker_shared::RecordId;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, HttpStickerSource};
use crate::config::{
    DEFAULT_ORIGIN, DEFAULT_ZOOM, MAP_ELEMENT_ID, STICKER_ID_ATTRIBUTE, STICKER_TITLE_ELEMENT_ID,
    SyncConfig, UPLOAD_REDIRECT_DELAY_MS,
};
use crate::facts::SummaryFacts;
use crate::leaflet::{LeafletSurface, js_error_text};
use crate::markers::MarkerRegistry;
use crate::projection::SightingSummary;
use crate::status::{StatusBoard, StatusEntry, StatusMessage};
use crate::sync::{PageView, SyncOrchestrator, refresh};
use crate::time_format::format_date;

const WIKI_SAVED_TEXT: &str = "Wiki content updated!";
const WIKI_FAILED_TEXT: &str = "Error saving wiki content";
const UPLOAD_FAILED_TEXT: &str = "Error uploading sticker";
const LOCATION_REQUIRED_TEXT: &str = "Please allow location access to upload stickers";
const MAP_FAILED_TEXT: &str = "Error loading map";
/// `Number.MAX_SAFE_INTEGER`; larger JS numbers no longer identify a single integer.
const MAX_SAFE_JS_INTEGER: f64 = 9_007_199_254_740_991.0;

type PageSync = SyncOrchestrator<LeafletSurface, SignalView>;

thread_local! {
    static PAGE_SYNC: RefCell<Option<Rc<RefCell<PageSync>>>> = const { RefCell::new(None) };
    static PAGE_STATUS: Cell<Option<RwSignal<StatusBoard>>> = const { Cell::new(None) };
}

/// Page surfaces backed by reactive signals; the view below renders whatever they hold.
#[derive(Clone, Copy)]
pub(crate) struct SignalView {
    rows: RwSignal<Vec<SightingSummary>>,
    facts: RwSignal<Option<SummaryFacts>>,
    statuses: RwSignal<StatusBoard>,
}

impl PageView for SignalView {
    fn render_sightings(&mut self, rows: &[SightingSummary]) {
        self.rows.set(rows.to_vec());
    }

    fn render_facts(&mut self, facts: &SummaryFacts) {
        self.facts.set(Some(facts.clone()));
    }

    fn show_status(&mut self, status: StatusMessage) {
        post_status(self.statuses, status);
    }
}

/// Show `status` and dismiss that one message when its time is up.
fn post_status(board: RwSignal<StatusBoard>, status: StatusMessage) {
    let delay = status.dismiss_after_ms;
    let Some(id) = board.try_update(|b| b.push(status)) else {
        return;
    };
    Timeout::new(delay, move || {
        // The board may already be gone if the app was unmounted.
        let _ = board.try_update(|b| b.dismiss(id));
    })
    .forget();
}

fn notify(status: StatusMessage) {
    match PAGE_STATUS.with(Cell::get) {
        Some(board) => post_status(board, status),
        None => tracing::info!(text = %status.text, "status with no page mounted"),
    }
}

fn page_sticker_id() -> Option<RecordId> {
    let document = web_sys::window()?.document()?;
    let raw = document
        .get_element_by_id(STICKER_TITLE_ELEMENT_ID)?
        .get_attribute(STICKER_ID_ATTRIBUTE)?;
    RecordId::from_token(&raw)
}

fn id_from_js(value: &JsValue) -> Option<RecordId> {
    if let Some(number) = value.as_f64() {
        return id_from_number(number);
    }
    value.as_string().and_then(|text| RecordId::from_token(&text))
}

fn id_from_number(number: f64) -> Option<RecordId> {
    let exact = number.is_finite() && number.fract() == 0.0 && number.abs() <= MAX_SAFE_JS_INTEGER;
    exact.then(|| RecordId::Int(number as i64))
}

fn check_location(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid { Ok(()) } else { Err(LOCATION_REQUIRED_TEXT) }
}

fn current_sync() -> Option<Rc<RefCell<PageSync>>> {
    PAGE_SYNC.with(|slot| slot.borrow().clone())
}

fn start_sync(sticker_id: RecordId, view: SignalView) {
    let surface = match LeafletSurface::mount(MAP_ELEMENT_ID, DEFAULT_ORIGIN, DEFAULT_ZOOM) {
        Ok(surface) => surface,
        Err(e) => {
            tracing::error!(error = %e, "map unavailable");
            post_status(view.statuses, StatusMessage::error(MAP_FAILED_TEXT));
            return;
        }
    };
    tracing::info!(sticker = %sticker_id, "starting sighting sync");
    let orchestrator = SyncOrchestrator::new(
        sticker_id,
        MarkerRegistry::new(surface),
        view,
        SyncConfig::default(),
    );
    PAGE_SYNC.with(|slot| *slot.borrow_mut() = Some(Rc::new(RefCell::new(orchestrator))));
    trigger_refresh();
}

/// Start a new pass; an older pass still in flight will be discarded when it lands.
fn trigger_refresh() -> bool {
    let Some(sync) = current_sync() else {
        tracing::warn!("refresh requested before the sighting map was ready");
        return false;
    };
    {
        let guard = sync.borrow();
        tracing::debug!(
            state = ?guard.state(),
            markers = guard.registry().len(),
            "refresh requested"
        );
    }
    spawn_local(async move {
        refresh(&*sync, &HttpStickerSource).await;
    });
    true
}

fn schedule_redirect(path: String) {
    Timeout::new(UPLOAD_REDIRECT_DELAY_MS, move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(&path) {
            tracing::warn!(error = %js_error_text(&e), path = %path, "redirect failed");
        }
    })
    .forget();
}

/// Re-fetch the sighting set of the sticker on this page.
#[wasm_bindgen(js_name = refreshSightings)]
pub fn refresh_sightings() -> bool {
    trigger_refresh()
}

/// Save wiki text, then refresh so "last updated" reflects the edit.
#[wasm_bindgen(js_name = saveWiki)]
pub async fn save_wiki(sticker_id: JsValue, content: String) -> Result<(), JsValue> {
    let Some(sticker_id) = id_from_js(&sticker_id) else {
        return Err(JsValue::from_str("invalid sticker id"));
    };
    match api::save_wiki(&sticker_id, &content).await {
        Ok(()) => {
            notify(StatusMessage::success(WIKI_SAVED_TEXT));
            let on_this_page = current_sync().is_some_and(|sync| {
                let guard = sync.borrow();
                guard.sticker_id() == &sticker_id
            });
            if on_this_page {
                trigger_refresh();
            }
            Ok(())
        }
        Err(err) => {
            tracing::warn!(sticker = %sticker_id, error = %err, "wiki save failed");
            let text = err.user_text(WIKI_FAILED_TEXT);
            notify(StatusMessage::error(text.clone()));
            Err(JsValue::from_str(&text))
        }
    }
}

/// Upload a sticker photo at a location. Resolves to `{message, redirect}` and navigates to
/// the sticker page shortly after.
#[wasm_bindgen(js_name = uploadSighting)]
pub async fn upload_sighting(
    file: web_sys::File,
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    description: Option<String>,
) -> Result<JsValue, JsValue> {
    if let Err(text) = check_location(latitude, longitude) {
        notify(StatusMessage::error(text));
        return Err(JsValue::from_str(text));
    }
    let result = api::upload_sighting(
        &file,
        latitude,
        longitude,
        name.as_deref().unwrap_or_default(),
        description.as_deref().unwrap_or_default(),
    )
    .await;

    match result {
        Ok(outcome) => {
            tracing::info!(sticker = %outcome.sticker_id(), "sighting uploaded");
            notify(outcome.status_message());
            let receipt = outcome.receipt();
            schedule_redirect(receipt.redirect.clone());
            serde_wasm_bindgen::to_value(&receipt).map_err(|e| JsValue::from_str(&e.to_string()))
        }
        Err(err) => {
            tracing::warn!(error = %err, "upload failed");
            let text = err.user_text(UPLOAD_FAILED_TEXT);
            notify(StatusMessage::error(text.clone()));
            Err(JsValue::from_str(&text))
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let rows: RwSignal<Vec<SightingSummary>> = RwSignal::new(Vec::new());
    let facts: RwSignal<Option<SummaryFacts>> = RwSignal::new(None);
    let statuses: RwSignal<StatusBoard> = RwSignal::new(StatusBoard::default());
    let signal_view = SignalView {
        rows,
        facts,
        statuses,
    };
    PAGE_STATUS.with(|slot| slot.set(Some(statuses)));

    let sticker_id = page_sticker_id();
    if sticker_id.is_none() {
        tracing::debug!("no sticker on this page; sighting sync idle");
    }
    let has_sticker = sticker_id.is_some();

    // Start syncing once the map container is in the DOM.
    Effect::new(move || {
        if let Some(id) = sticker_id.clone() {
            start_sync(id, signal_view);
        }
        on_cleanup(|| {
            PAGE_SYNC.with(|slot| slot.borrow_mut().take());
            PAGE_STATUS.with(|slot| slot.set(None));
        });
    });

    let first_spotted = move || {
        facts.with(|f| f.as_ref().map(|f| format_date(&f.first_spotted)).unwrap_or_default())
    };
    let sighting_count = move || {
        facts.with(|f| f.as_ref().map(|f| f.sighting_count.to_string()).unwrap_or_default())
    };
    let last_updated = move || {
        facts.with(|f| f.as_ref().map(|f| format_date(&f.last_updated)).unwrap_or_default())
    };

    view! {
        <div class="status-region">
            <For
                each=move || statuses.with(|board| board.entries().to_vec())
                key=|entry| entry.id
                children=|entry: StatusEntry| {
                    let class = format!("status-message {}", entry.message.kind.css_class());
                    view! { <div class=class>{entry.message.text}</div> }
                }
            />
        </div>
        {has_sticker.then(|| view! {
            <div id=MAP_ELEMENT_ID class="sticker-map"></div>
            <div class="quick-facts">
                <p>"First spotted: " <span id="first-spotted">{first_spotted}</span></p>
                <p>"Sightings: " <span id="sighting-count">{sighting_count}</span></p>
                <p>"Last updated: " <span id="last-updated">{last_updated}</span></p>
            </div>
            <div id="sightings-list">
                <For
                    each=move || rows.get()
                    key=|row| (row.id.clone(), row.location_label.clone(), row.spotted_label.clone())
                    children=|row: SightingSummary| view! {
                        <div class="sighting-card">
                            <img src=row.image_url alt="Sighting" />
                            <div class="sighting-info">
                                <p>{format!("Spotted: {}", row.spotted_label)}</p>
                                <p>{format!("Location: {}", row.location_label)}</p>
                            </div>
                        </div>
                    }
                />
            </div>
        })}
    }
}
