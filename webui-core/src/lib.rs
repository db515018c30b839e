//! Cluster WebUI core - state synchronization for the master dashboard
//!
//! The core owns the recurring fetch-and-normalize cycle:
//! - Polling of the master's `state.json` with exponential backoff
//! - Leader detection and redirect countdown when the local master is not leader
//! - Normalization of the raw payload into an immutable [`Snapshot`]
//! - A typed event stream so views re-render without touching the poller
//!
//! Nothing in here renders; views subscribe to the [`StateHub`] and read the
//! current snapshot.

pub mod backoff;
pub mod hub;
pub mod identity;
pub mod model;
pub mod normalizer;
pub mod poller;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod timer;

pub use backoff::Backoff;
pub use hub::{Banner, BannerKind, PollerPhase, StateHub, SyncEvent, Tab};
pub use identity::{Pid, PidError};
pub use model::{Executor, Framework, MasterState, Offer, Resources, Slave, SlaveState, Task};
pub use normalizer::{NoSelection, NormalizeError, Normalizer, Outcome, SelectionProbe};
pub use poller::{Poller, PollerConfig, PollerExit, PollerHandle};
pub use snapshot::{Aggregates, FrameworkEntry, OfferEntry, Shares, Snapshot};
pub use source::{FetchError, HttpJsonFetcher, HttpStateSource, JsonFetcher, StateSource};
pub use timer::{Countdown, CountdownHandle, CountdownOutcome};
