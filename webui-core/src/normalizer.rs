//! Interpretation of raw `state.json` payloads
//!
//! The normalizer decides, for every successfully fetched payload, whether
//! polling continues, whether the dashboard must move to another master, and
//! whether a new [`Snapshot`] gets published on the hub.

use crate::hub::{Banner, BannerKind, StateHub};
use crate::identity::{Pid, PidError};
use crate::model::MasterState;
use crate::snapshot::Snapshot;
use std::time::Duration;
use tracing::{debug, info};

/// Default bound on how long an active text selection may hold back updates.
pub const SELECTION_GRACE: Duration = Duration::from_millis(20_000);

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("malformed state payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid pid in state payload: {0}")]
    InvalidPid(#[from] PidError),
    #[error("offer {offer_id} references unknown {field} {target}")]
    DanglingOffer {
        offer_id: String,
        field: &'static str,
        target: String,
    },
}

/// Tells whether the consuming UI currently has selected text.
pub trait SelectionProbe: Send + Sync {
    fn has_selected_text(&self) -> bool;
}

/// A UI with no notion of text selection.
pub struct NoSelection;

impl SelectionProbe for NoSelection {
    fn has_selected_text(&self) -> bool {
        false
    }
}

/// Result of one normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Byte-identical to the last accepted payload.
    Unchanged,
    /// Held back by an active text selection.
    Deferred,
    /// A new snapshot was published.
    Updated,
    /// The polled master is not the leader. Polling must stop.
    Redirect(Pid),
}

impl Outcome {
    pub fn continue_polling(&self) -> bool {
        !matches!(self, Outcome::Redirect(_))
    }
}

pub struct Normalizer {
    hub: StateHub,
    selection: Box<dyn SelectionProbe>,
    grace: Duration,
    last_raw: Option<String>,
    since_update: Duration,
}

impl Normalizer {
    pub fn new(hub: StateHub) -> Self {
        Self::with_selection(hub, Box::new(NoSelection))
    }

    pub fn with_selection(hub: StateHub, selection: Box<dyn SelectionProbe>) -> Self {
        Self {
            hub,
            selection,
            grace: SELECTION_GRACE,
            last_raw: None,
            since_update: Duration::ZERO,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Time accounted since the last accepted update.
    pub fn since_update(&self) -> Duration {
        self.since_update
    }

    /// Normalizes `raw`. `elapsed` is the poll delay that preceded this
    /// payload; it counts toward the selection grace period.
    pub fn normalize(&mut self, raw: &str, elapsed: Duration) -> Result<Outcome, NormalizeError> {
        if self.last_raw.as_deref() == Some(raw) {
            return Ok(Outcome::Unchanged);
        }

        let state: MasterState = serde_json::from_str(raw)?;
        let pid = Pid::parse(&state.pid)?;

        let leader = match state.elected_leader() {
            None => {
                self.hub.show_banner(Banner::NoLeader);
                None
            }
            Some(leader) => {
                self.hub.hide_banner(BannerKind::NoLeader);
                let leader = Pid::parse(leader)?;
                if leader != pid {
                    info!("{} is not the leader, current leader is {}", pid, leader);
                    return Ok(Outcome::Redirect(leader));
                }
                self.hub.hide_banner(BannerKind::NotLeader);
                Some(leader)
            }
        };

        self.since_update += elapsed;
        if self.selection.has_selected_text() && self.since_update < self.grace {
            debug!(
                "text selected, holding update ({}ms since last update)",
                self.since_update.as_millis()
            );
            return Ok(Outcome::Deferred);
        }

        let snapshot = Snapshot::build(state, pid, leader)?;
        debug!(
            "state updated: {} slaves, {} frameworks, {} offers",
            snapshot.slaves.len(),
            snapshot.frameworks.len(),
            snapshot.offers.len()
        );

        self.last_raw = Some(raw.to_string());
        self.since_update = Duration::ZERO;
        self.hub.publish(snapshot);
        Ok(Outcome::Updated)
    }
}
