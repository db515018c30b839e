//! Application state shared between the sync core and the views
//!
//! The hub is the single place views read from: the current snapshot, the
//! visible banner, the poller phase and the navbar tab. The normalizer is the
//! only writer of the snapshot; every change is announced on a broadcast
//! channel so views can re-render.

use crate::identity::Pid;
use crate::snapshot::Snapshot;
use crate::state::{new_state, Shared};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 256;

/// Banner shown to the user. At most one is visible at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Banner {
    /// No leader is elected, the cluster is not ready yet.
    NoLeader,
    /// The polled master is not the leader; a redirect is counting down.
    NotLeader { leader: Pid, redirect_in: Duration },
    /// The last fetch failed; the next retry is counting down.
    FetchError { retry_in: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BannerKind {
    NoLeader,
    NotLeader,
    FetchError,
}

impl Banner {
    pub fn kind(&self) -> BannerKind {
        match self {
            Banner::NoLeader => BannerKind::NoLeader,
            Banner::NotLeader { .. } => BannerKind::NotLeader,
            Banner::FetchError { .. } => BannerKind::FetchError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PollerPhase {
    Idle,
    Fetching,
    Normalizing,
    Backoff { retry_in: Duration },
    Redirecting { leader: Pid, remaining: Duration },
}

/// Navbar tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Tab {
    #[default]
    Home,
    Dashboard,
    Frameworks,
    Slaves,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new snapshot has been published; re-read it from the hub.
    StateUpdated,
    BannerChanged(Option<Banner>),
    PhaseChanged(PollerPhase),
    TabChanged(Tab),
}

#[derive(Clone)]
pub struct StateHub {
    snapshot: Shared<Option<Arc<Snapshot>>>,
    banner: Shared<Option<Banner>>,
    phase: Shared<PollerPhase>,
    tab: Shared<Tab>,
    events: broadcast::Sender<SyncEvent>,
}

impl StateHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            snapshot: new_state(None),
            banner: new_state(None),
            phase: new_state(PollerPhase::Idle),
            tab: new_state(Tab::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Current snapshot, if one has been published yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.lock().clone()
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        *self.snapshot.lock() = Some(Arc::new(snapshot));
        self.emit(SyncEvent::StateUpdated);
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner.lock().clone()
    }

    /// Shows `banner`, replacing whatever banner was visible.
    pub fn show_banner(&self, banner: Banner) {
        let changed = {
            let mut current = self.banner.lock();
            if current.as_ref() == Some(&banner) {
                false
            } else {
                *current = Some(banner.clone());
                true
            }
        };
        if changed {
            self.emit(SyncEvent::BannerChanged(Some(banner)));
        }
    }

    /// Hides the visible banner if it is of `kind`.
    pub fn hide_banner(&self, kind: BannerKind) {
        let hidden = {
            let mut current = self.banner.lock();
            match current.as_ref() {
                Some(banner) if banner.kind() == kind => {
                    *current = None;
                    true
                }
                _ => false,
            }
        };
        if hidden {
            self.emit(SyncEvent::BannerChanged(None));
        }
    }

    pub fn phase(&self) -> PollerPhase {
        self.phase.lock().clone()
    }

    pub(crate) fn set_phase(&self, phase: PollerPhase) {
        *self.phase.lock() = phase.clone();
        self.emit(SyncEvent::PhaseChanged(phase));
    }

    pub fn tab(&self) -> Tab {
        *self.tab.lock()
    }

    pub fn set_tab(&self, tab: Tab) {
        let previous = std::mem::replace(&mut *self.tab.lock(), tab);
        if previous != tab {
            self.emit(SyncEvent::TabChanged(tab));
        }
    }

    fn emit(&self, event: SyncEvent) {
        // No subscriber is fine: views may not be attached yet.
        if self.events.send(event).is_err() {
            debug!("sync event dropped, no subscriber");
        }
    }
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}
