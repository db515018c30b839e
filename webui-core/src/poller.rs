//! The polling loop
//!
//! One fetch at a time; the next poll is scheduled only once the current
//! cycle has completed, so a slow master naturally slows the dashboard down.
//!
//! ```text
//! Idle -> Fetching -> Normalizing -> Idle            (continue at the base delay)
//!                               \-> Redirecting      (countdown, then exit)
//!            \-> Backoff -> Idle                     (countdown elapsed or dismissed)
//! ```

use crate::backoff::Backoff;
use crate::hub::{Banner, BannerKind, PollerPhase, StateHub};
use crate::identity::Pid;
use crate::normalizer::{Normalizer, Outcome, SelectionProbe, SELECTION_GRACE};
use crate::source::StateSource;
use crate::timer::{Countdown, CountdownOutcome};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Polling timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between successful polls, and the first backoff step.
    pub base_delay: Duration,
    /// Once reached, the next failure restarts from `base_delay`.
    pub max_delay: Duration,
    /// Countdown granularity.
    pub tick: Duration,
    pub redirect_countdown: Duration,
    pub selection_grace: Duration,
    /// Delay before polling again once the error indicator goes away.
    pub min_retry: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(128_000),
            tick: Duration::from_millis(1000),
            redirect_countdown: Duration::from_millis(6000),
            selection_grace: SELECTION_GRACE,
            min_retry: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollerCommand {
    DismissError,
    Shutdown,
}

/// Control surface of a running poller.
#[derive(Clone)]
pub struct PollerHandle {
    commands: mpsc::UnboundedSender<PollerCommand>,
}

impl PollerHandle {
    /// The user dismissed the error indicator: stop the retry countdown,
    /// reset the backoff and poll again shortly.
    pub fn dismiss_error(&self) {
        let _ = self.commands.send(PollerCommand::DismissError);
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(PollerCommand::Shutdown);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerExit {
    /// The redirect countdown elapsed; the dashboard should move to this leader.
    Redirected(Pid),
    Shutdown,
}

pub struct Poller<S> {
    source: S,
    hub: StateHub,
    normalizer: Normalizer,
    backoff: Backoff,
    config: PollerConfig,
    commands_tx: mpsc::UnboundedSender<PollerCommand>,
    commands: mpsc::UnboundedReceiver<PollerCommand>,
}

impl<S: StateSource> Poller<S> {
    pub fn new(source: S, hub: StateHub, config: PollerConfig) -> Self {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let normalizer = Normalizer::new(hub.clone()).with_grace(config.selection_grace);
        Self {
            source,
            backoff: Backoff::new(config.base_delay, config.max_delay),
            normalizer,
            hub,
            config,
            commands_tx,
            commands,
        }
    }

    /// Holds back updates while `probe` reports selected text.
    pub fn with_selection(mut self, probe: Box<dyn SelectionProbe>) -> Self {
        self.normalizer =
            Normalizer::with_selection(self.hub.clone(), probe).with_grace(self.config.selection_grace);
        self
    }

    pub fn handle(&self) -> PollerHandle {
        PollerHandle { commands: self.commands_tx.clone() }
    }

    pub async fn run(mut self) -> PollerExit {
        info!("polling {}", self.source.describe());
        let mut wait = Duration::ZERO;

        loop {
            self.hub.set_phase(PollerPhase::Idle);
            if !self.idle(wait).await {
                return PollerExit::Shutdown;
            }

            self.hub.set_phase(PollerPhase::Fetching);
            let raw = match self.source.fetch().await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("failed to fetch state from {}: {}", self.source.describe(), e);
                    match self.recover().await {
                        Ok(next) => {
                            wait = next;
                            continue;
                        }
                        Err(exit) => return exit,
                    }
                }
            };

            self.hub.set_phase(PollerPhase::Normalizing);
            wait = match self.normalizer.normalize(&raw, self.backoff.current()) {
                Ok(Outcome::Redirect(leader)) => return self.redirect(leader).await,
                Ok(_) => {
                    self.backoff.reset();
                    self.backoff.current()
                }
                Err(e) => {
                    error!("rejected state payload from {}: {}", self.source.describe(), e);
                    match self.recover().await {
                        Ok(next) => next,
                        Err(exit) => return exit,
                    }
                }
            };
        }
    }

    /// Waits `wait` before the next fetch. `false` means shutdown.
    async fn idle(&mut self, wait: Duration) -> bool {
        let sleep = tokio::time::sleep(wait);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                Some(command) = self.commands.recv() => {
                    if command == PollerCommand::Shutdown {
                        return false;
                    }
                }
            }
        }
    }

    /// Backs off after a failed cycle. Returns the wait before the next poll.
    async fn recover(&mut self) -> Result<Duration, PollerExit> {
        // Dismissals sent before this error was shown do not apply to it.
        while let Ok(command) = self.commands.try_recv() {
            if command == PollerCommand::Shutdown {
                return Err(PollerExit::Shutdown);
            }
            debug!("dropping stale {:?}", command);
        }

        let delay = self.backoff.on_failure();
        warn!("retrying in {}ms", delay.as_millis());

        self.hub.show_banner(Banner::FetchError { retry_in: delay });
        self.hub.set_phase(PollerPhase::Backoff { retry_in: delay });

        let hub = self.hub.clone();
        let countdown = Countdown::start_observed(delay, self.config.tick, move |remaining| {
            hub.show_banner(Banner::FetchError { retry_in: remaining });
            hub.set_phase(PollerPhase::Backoff { retry_in: remaining });
        });
        let handle = countdown.handle();
        let finished = countdown.finished();
        tokio::pin!(finished);

        let outcome = loop {
            tokio::select! {
                outcome = &mut finished => break outcome,
                Some(command) = self.commands.recv() => match command {
                    PollerCommand::DismissError => {
                        if handle.cancel() {
                            info!("retry countdown dismissed, backoff reset");
                            self.backoff.reset();
                        }
                    }
                    PollerCommand::Shutdown => {
                        handle.cancel();
                        return Err(PollerExit::Shutdown);
                    }
                },
            }
        };

        if outcome == CountdownOutcome::Elapsed {
            info!("retry countdown elapsed (backoff at {}ms)", self.backoff.current().as_millis());
        }
        self.hub.hide_banner(BannerKind::FetchError);
        Ok(self.config.min_retry)
    }

    /// Counts down, then hands the leader back to the caller.
    async fn redirect(&mut self, leader: Pid) -> PollerExit {
        let total = self.config.redirect_countdown;
        info!("redirecting to {} in {}ms", leader.leader_url(), total.as_millis());

        self.hub.show_banner(Banner::NotLeader { leader: leader.clone(), redirect_in: total });
        self.hub.set_phase(PollerPhase::Redirecting { leader: leader.clone(), remaining: total });

        let hub = self.hub.clone();
        let target = leader.clone();
        let countdown = Countdown::start_observed(total, self.config.tick, move |remaining| {
            hub.show_banner(Banner::NotLeader { leader: target.clone(), redirect_in: remaining });
            hub.set_phase(PollerPhase::Redirecting { leader: target.clone(), remaining });
        });
        let handle = countdown.handle();
        let finished = countdown.finished();
        tokio::pin!(finished);

        loop {
            tokio::select! {
                _ = &mut finished => break,
                Some(command) = self.commands.recv() => {
                    if command == PollerCommand::Shutdown {
                        handle.cancel();
                        return PollerExit::Shutdown;
                    }
                }
            }
        }

        info!("navigating to {}", leader.leader_url());
        PollerExit::Redirected(leader)
    }
}
