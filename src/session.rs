//! Per-session result state.
//!
//! Each browser session owns one slot holding the latest successful
//! prediction. Recording a success is the only mutation the store offers;
//! failed or incomplete submissions have no entry point here, so whatever the
//! user last saw stays on screen. Sessions never observe each other's slots.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::types::{PredictionRequest, PredictionResult};

/// Whether the result panel has anything to show yet.
///
/// Transitions: `Hidden -> Visible` and `Visible -> Visible` on a successful
/// prediction. Nothing in the core logic goes back to `Hidden`; only a fresh
/// session starts there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Hidden,
    Visible,
}

/// The last successful prediction and the details that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct LastPrediction {
    pub car: PredictionRequest,
    pub result: PredictionResult,
}

/// Snapshot of one session's slot, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub visibility: Visibility,
    pub last: Option<LastPrediction>,
}

#[derive(Debug, Default)]
struct SessionState {
    last: Option<LastPrediction>,
}

/// Registry of per-session state, keyed by the session cookie id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session in the `Hidden` state.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().insert(id, SessionState::default());
        id
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Replace the session's slot with a fresh success. This is the
    /// `Hidden -> Visible` / `Visible -> Visible` transition.
    pub fn record_success(&self, id: Uuid, car: PredictionRequest, result: PredictionResult) {
        let mut sessions = self.sessions.write();
        let state = sessions.entry(id).or_default();
        state.last = Some(LastPrediction { car, result });
    }

    /// Snapshot the session for rendering. Unknown ids render as a fresh
    /// `Hidden` session.
    pub fn view(&self, id: Uuid) -> SessionView {
        let sessions = self.sessions.read();
        let last = sessions.get(&id).and_then(|s| s.last.clone());
        SessionView {
            visibility: match last {
                Some(_) => Visibility::Visible,
                None => Visibility::Hidden,
            },
            last,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
