//! Cluster lifecycle mutations: start, stop, and the composed restart.
//!
//! At most one mutation of a given kind is pending at a time; a trigger that
//! arrives while its kind is pending is dropped. Restart is a strict
//! two-step sequence (stop, then start only if the stop succeeded) with
//! the failing step's error surfaced as-is. Every successful mutation marks
//! all cached resources for immediate refetch so the dashboard reflects the
//! new cluster state on the next poll.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::api::SparkApi;
use crate::model::ClusterConfig;
use crate::poll::{ErrorInfo, Invalidator};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionKind {
    Start,
    Stop,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Pending,
    Error(ErrorInfo),
}

impl ActionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ActionState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-kind mutation state handed to the renderer.
#[derive(Clone, Debug, Default)]
pub struct ActionSnapshot {
    pub start: ActionState,
    pub stop: ActionState,
}

impl ActionSnapshot {
    pub fn is_mutating(&self) -> bool {
        self.start.is_pending() || self.stop.is_pending()
    }

    /// First surfaced error, stop taking precedence (it is the step that
    /// aborts a restart).
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.stop.error().or_else(|| self.start.error())
    }
}

pub struct ClusterActions<A> {
    api: Arc<A>,
    invalidator: Invalidator,
    states: Mutex<ActionSnapshot>,
}

impl<A: SparkApi> ClusterActions<A> {
    pub fn new(api: Arc<A>, invalidator: Invalidator) -> Self {
        Self {
            api,
            invalidator,
            states: Mutex::new(ActionSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> ActionSnapshot {
        self.states.lock().unwrap().clone()
    }

    pub fn is_mutating(&self) -> bool {
        self.states.lock().unwrap().is_mutating()
    }

    /// Create the cluster. No-op if a start is already pending.
    pub async fn start(&self, config: Option<ClusterConfig>) {
        self.run_start(config).await;
    }

    /// Tear the cluster down. No-op if a stop is already pending.
    pub async fn stop(&self) {
        self.run_stop().await;
    }

    /// Stop, then start, strictly in that order. A failed stop aborts the
    /// sequence and the start request is never issued.
    pub async fn restart(&self, config: Option<ClusterConfig>) {
        if !self.run_stop().await {
            return;
        }
        self.run_start(config).await;
    }

    async fn run_start(&self, config: Option<ClusterConfig>) -> bool {
        if !self.begin(ActionKind::Start) {
            return false;
        }
        match self.api.create_cluster(config).await {
            Ok(resp) => {
                info!(cluster_id = %resp.cluster_id, master_url = %resp.master_url, "cluster created");
                self.settle(ActionKind::Start, ActionState::Idle);
                self.invalidator.invalidate_all();
                true
            }
            Err(err) => {
                warn!(error = %err, "cluster create failed");
                self.settle(ActionKind::Start, ActionState::Error(ErrorInfo::from(&err)));
                false
            }
        }
    }

    async fn run_stop(&self) -> bool {
        if !self.begin(ActionKind::Stop) {
            return false;
        }
        match self.api.delete_cluster().await {
            Ok(resp) => {
                info!(message = %resp.message, "cluster deleted");
                self.settle(ActionKind::Stop, ActionState::Idle);
                self.invalidator.invalidate_all();
                true
            }
            Err(err) => {
                warn!(error = %err, "cluster delete failed");
                self.settle(ActionKind::Stop, ActionState::Error(ErrorInfo::from(&err)));
                false
            }
        }
    }

    /// Move a kind to pending; false means that kind is already pending and
    /// the trigger is dropped.
    fn begin(&self, kind: ActionKind) -> bool {
        let mut states = self.states.lock().unwrap();
        let state = match kind {
            ActionKind::Start => &mut states.start,
            ActionKind::Stop => &mut states.stop,
        };
        if state.is_pending() {
            warn!(?kind, "mutation already pending, ignoring trigger");
            return false;
        }
        *state = ActionState::Pending;
        true
    }

    fn settle(&self, kind: ActionKind, outcome: ActionState) {
        let mut states = self.states.lock().unwrap();
        match kind {
            ActionKind::Start => states.start = outcome,
            ActionKind::Stop => states.stop = outcome,
        }
    }
}
