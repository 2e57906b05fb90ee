//! State shared between the frame producer and the HTTP handlers

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::interaction::InteractionState;
use crate::telemetry::PipelineCounters;

/// Encoded parts kept for slow viewers before they start skipping
const FRAME_BUFFER: usize = 4;

/// Read-only view of the session, refreshed by the producer every frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub camera_open: bool,
    pub detector: String,
    pub fps: f64,
    pub frame_time_ms: f64,
    pub colors_visible: bool,
    pub pen_sizes_visible: bool,
    pub board_visible: bool,
    pub brush_width: u32,
    pub selected_color: [u8; 3],
}

impl StatusSnapshot {
    /// Copy the interaction fields out of the live state
    pub fn update_from(&mut self, state: &InteractionState) {
        self.colors_visible = state.panels.colors;
        self.pen_sizes_visible = state.panels.pen_sizes;
        self.board_visible = state.panels.board;
        self.brush_width = state.brush_width;
        self.selected_color = state.selected_color.0;
    }
}

/// Body of `/api/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub viewers: usize,
    pub frames_emitted: u64,
    pub capture_failures: u64,
    pub frames_without_hand: u64,
    pub encode_failures: u64,
}

/// Shared state accessible by the producer and API handlers
pub struct SharedState {
    snapshot: RwLock<StatusSnapshot>,
    /// `None` once the stream has been closed for shutdown
    frame_tx: Mutex<Option<broadcast::Sender<Bytes>>>,
    counters: PipelineCounters,
}

pub type SharedStateHandle = Arc<SharedState>;

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub fn new() -> Self {
        let (frame_tx, _) = broadcast::channel(FRAME_BUFFER);
        Self {
            snapshot: RwLock::new(StatusSnapshot::default()),
            frame_tx: Mutex::new(Some(frame_tx)),
            counters: PipelineCounters::default(),
        }
    }

    pub fn handle(self) -> SharedStateHandle {
        Arc::new(self)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.read().clone()
    }

    /// Apply `f` to the snapshot; skipped if a reader holds the lock
    pub fn update_snapshot(&self, f: impl FnOnce(&mut StatusSnapshot)) {
        if let Some(mut guard) = self.snapshot.try_write() {
            f(&mut *guard);
        }
    }

    pub fn counters(&self) -> &PipelineCounters {
        &self.counters
    }

    /// Publish one encoded part to every connected viewer
    pub fn publish(&self, part: Bytes) {
        if let Some(tx) = self.frame_tx.lock().as_ref() {
            // No receivers is fine
            let _ = tx.send(part);
            PipelineCounters::incr(&self.counters.frames_emitted);
        }
    }

    /// Register a viewer; `None` after the stream was closed
    pub fn subscribe(&self) -> Option<broadcast::Receiver<Bytes>> {
        self.frame_tx.lock().as_ref().map(|tx| tx.subscribe())
    }

    /// Viewers currently holding a receiver
    pub fn viewer_count(&self) -> usize {
        self.frame_tx
            .lock()
            .as_ref()
            .map_or(0, |tx| tx.receiver_count())
    }

    /// End every viewer stream; later subscriptions are refused
    pub fn close(&self) {
        if self.frame_tx.lock().take().is_some() {
            tracing::info!("Frame stream closed");
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            snapshot: self.snapshot(),
            viewers: self.viewer_count(),
            frames_emitted: PipelineCounters::get(&self.counters.frames_emitted),
            capture_failures: PipelineCounters::get(&self.counters.capture_failures),
            frames_without_hand: PipelineCounters::get(&self.counters.frames_without_hand),
            encode_failures: PipelineCounters::get(&self.counters.encode_failures),
        }
    }
}
