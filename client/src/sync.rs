use std::cell::RefCell;
use std::future::Future;

use sticker_shared::{Coordinate, RecordId, StickerDetail};
use thiserror::Error;

use crate::api::NetworkError;
use crate::config::SyncConfig;
use crate::facts::{self, EmptySetError, SummaryFacts};
use crate::markers::{MapError, MapSurface, MarkerRegistry, ReconcileDiff};
use crate::normalize::{ValidationError, normalize_detail};
use crate::projection::{SightingSummary, project};
use crate::status::StatusMessage;
use crate::viewport::{self, ViewportBounds};

const LOAD_FAILED_TEXT: &str = "Error loading sightings";

/// Server collaborator for sticker detail.
pub trait StickerSource {
    fn fetch_detail(
        &self,
        sticker_id: &RecordId,
    ) -> impl Future<Output = Result<StickerDetail, NetworkError>>;
}

/// List, facts and status surfaces of the page. The map is reached only through the
/// marker registry.
pub trait PageView {
    fn render_sightings(&mut self, rows: &[SightingSummary]);
    fn render_facts(&mut self, facts: &SummaryFacts);
    fn show_status(&mut self, status: StatusMessage);
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    EmptySet(#[from] EmptySetError),
    #[error(transparent)]
    Map(#[from] MapError),
}

impl SyncError {
    pub fn user_text(&self) -> String {
        match self {
            SyncError::Network(e) => e.user_text(LOAD_FAILED_TEXT),
            _ => LOAD_FAILED_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Proof of a started pass. Only the most recently issued ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    nonce: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub diff: ReconcileDiff,
    pub bounds: Option<ViewportBounds>,
    pub facts: SummaryFacts,
    pub listed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Ready(PassReport),
    Failed(SyncError),
    /// A newer refresh was requested while this one was in flight; its data was dropped.
    Superseded,
}

/// Everything a pass will render, computed before anything is touched.
struct PreparedPass {
    sightings: Vec<sticker_shared::Sighting>,
    bounds: Option<ViewportBounds>,
    rows: Vec<SightingSummary>,
    facts: SummaryFacts,
}

/// Drives fetch → normalize → reconcile → fit → project → derive → render for one sticker.
pub struct SyncOrchestrator<M: MapSurface, V: PageView> {
    sticker_id: RecordId,
    config: SyncConfig,
    registry: MarkerRegistry<M>,
    view: V,
    state: SyncState,
    latest_nonce: u64,
}

impl<M: MapSurface, V: PageView> SyncOrchestrator<M, V> {
    pub fn new(
        sticker_id: RecordId,
        registry: MarkerRegistry<M>,
        view: V,
        config: SyncConfig,
    ) -> Self {
        Self {
            sticker_id,
            config,
            registry,
            view,
            state: SyncState::Idle,
            latest_nonce: 0,
        }
    }

    pub fn sticker_id(&self) -> &RecordId {
        &self.sticker_id
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn registry(&self) -> &MarkerRegistry<M> {
        &self.registry
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Start a pass. Any pass already in flight is superseded.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.latest_nonce = self.latest_nonce.wrapping_add(1);
        self.state = SyncState::Loading;
        RefreshTicket {
            nonce: self.latest_nonce,
        }
    }

    /// Finish a pass with the server's answer.
    ///
    /// Stale tickets are dropped without side effects. Otherwise the whole pass is computed
    /// first and rendered only if every stage succeeded; on failure the previous markers,
    /// list and facts stay as they were and a status message is shown.
    pub fn complete(
        &mut self,
        ticket: RefreshTicket,
        fetched: Result<StickerDetail, NetworkError>,
    ) -> PassOutcome {
        if ticket.nonce != self.latest_nonce {
            tracing::debug!(
                sticker = %self.sticker_id,
                nonce = ticket.nonce,
                latest = self.latest_nonce,
                "discarding superseded sighting pass"
            );
            return PassOutcome::Superseded;
        }

        let result = fetched
            .map_err(SyncError::from)
            .and_then(|detail| self.prepare(&detail))
            .and_then(|prepared| self.apply(prepared));

        match result {
            Ok(report) => {
                self.state = SyncState::Ready;
                tracing::info!(
                    sticker = %self.sticker_id,
                    sightings = report.listed,
                    added = report.diff.added.len(),
                    removed = report.diff.removed.len(),
                    "sightings synced"
                );
                PassOutcome::Ready(report)
            }
            Err(err) => {
                self.state = SyncState::Failed;
                if let SyncError::EmptySet(_) = err {
                    tracing::error!(sticker = %self.sticker_id, error = %err, "unguarded empty sighting set");
                } else {
                    tracing::warn!(sticker = %self.sticker_id, error = %err, "sighting pass failed");
                }
                self.view.show_status(StatusMessage::error(err.user_text()));
                PassOutcome::Failed(err)
            }
        }
    }

    fn prepare(&self, detail: &StickerDetail) -> Result<PreparedPass, SyncError> {
        let normalized = normalize_detail(detail)?;
        if normalized.sticker_id != self.sticker_id {
            tracing::warn!(
                requested = %self.sticker_id,
                received = %normalized.sticker_id,
                "sticker detail id mismatch"
            );
        }

        let points: Vec<Coordinate> = normalized.sightings.iter().map(|s| s.coordinate).collect();
        let bounds = viewport::fit(&points, self.config.fit_padding);
        let rows = project(&normalized.sightings, self.config.coordinate_precision);
        let facts = if normalized.sightings.is_empty() {
            SummaryFacts::without_sightings(
                &normalized.created_at,
                normalized.wiki_updated_at.as_ref(),
            )
        } else {
            facts::derive(
                &normalized.sightings,
                &normalized.created_at,
                normalized.wiki_updated_at.as_ref(),
            )?
        };

        Ok(PreparedPass {
            sightings: normalized.sightings,
            bounds,
            rows,
            facts,
        })
    }

    /// The marker reconcile is the only fallible step and runs first; it rolls itself back.
    fn apply(&mut self, prepared: PreparedPass) -> Result<PassReport, SyncError> {
        let diff = self.registry.reconcile(&prepared.sightings)?;
        if diff.is_noop() {
            tracing::debug!(sticker = %self.sticker_id, "marker set unchanged");
        }
        if let Some(bounds) = &prepared.bounds {
            tracing::debug!(
                lat_span = bounds.lat_span(),
                lon_span = bounds.lon_span(),
                "fitting view to sightings"
            );
            self.registry.fit_view(bounds);
        }
        self.view.render_sightings(&prepared.rows);
        self.view.render_facts(&prepared.facts);

        Ok(PassReport {
            diff,
            bounds: prepared.bounds,
            facts: prepared.facts,
            listed: prepared.rows.len(),
        })
    }
}

/// Run one refresh against a shared orchestrator.
///
/// The borrow is released while the server call is pending so a newer refresh can start;
/// when this pass resumes it is discarded if it was superseded.
pub async fn refresh<M, V, S>(orchestrator: &RefCell<SyncOrchestrator<M, V>>, source: &S) -> PassOutcome
where
    M: MapSurface,
    V: PageView,
    S: StickerSource,
{
    let (ticket, sticker_id) = {
        let mut guard = orchestrator.borrow_mut();
        (guard.begin_refresh(), guard.sticker_id().clone())
    };
    let fetched = source.fetch_detail(&sticker_id).await;
    orchestrator.borrow_mut().complete(ticket, fetched)
}
