//! Tick-based countdowns with a cancellable handle
//!
//! Used for the backoff retry indicator and the leader redirect. A countdown
//! decrements its remaining time by one step per step until zero.

use crate::state::{new_state, Shared};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Elapsed,
    Cancelled,
}

/// Cancels a running countdown. Clones share the same countdown.
#[derive(Clone)]
pub struct CountdownHandle {
    cancel: Shared<Option<oneshot::Sender<()>>>,
}

impl CountdownHandle {
    /// Returns `true` only if the countdown was still running.
    pub fn cancel(&self) -> bool {
        match self.cancel.lock().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

pub struct Countdown {
    remaining: watch::Receiver<Duration>,
    handle: CountdownHandle,
    task: JoinHandle<CountdownOutcome>,
}

impl Countdown {
    pub fn start(total: Duration, step: Duration) -> Self {
        Self::start_observed(total, step, |_| {})
    }

    /// Starts a countdown that calls `on_tick` with the remaining time after
    /// every step.
    pub fn start_observed<F>(total: Duration, step: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(Duration) + Send + 'static,
    {
        let step = if step.is_zero() { total } else { step };
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let (remaining_tx, remaining_rx) = watch::channel(total);
        let handle = CountdownHandle { cancel: new_state(Some(cancel_tx)) };

        // The task keeps the sender slot alive so dropping every handle does
        // not read as a cancellation.
        let slot = handle.cancel.clone();
        let task = tokio::spawn(async move {
            let mut remaining = total;
            loop {
                if remaining.is_zero() {
                    slot.lock().take();
                    return CountdownOutcome::Elapsed;
                }
                tokio::select! {
                    _ = &mut cancel_rx => return CountdownOutcome::Cancelled,
                    _ = tokio::time::sleep(step) => {
                        remaining = remaining.saturating_sub(step);
                        let _ = remaining_tx.send(remaining);
                        on_tick(remaining);
                    }
                }
            }
        });

        Self { remaining: remaining_rx, handle, task }
    }

    pub fn remaining(&self) -> Duration {
        *self.remaining.borrow()
    }

    pub fn handle(&self) -> CountdownHandle {
        self.handle.clone()
    }

    pub async fn finished(self) -> CountdownOutcome {
        self.task.await.unwrap_or(CountdownOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_elapses_in_steps() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let countdown = Countdown::start_observed(
            Duration::from_millis(6000),
            Duration::from_millis(1000),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        let handle = countdown.handle();

        let started = tokio::time::Instant::now();
        assert_eq!(countdown.finished().await, CountdownOutcome::Elapsed);
        assert_eq!(started.elapsed(), Duration::from_millis(6000));
        assert_eq!(ticks.load(Ordering::SeqCst), 6);
        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_running_countdown() {
        let countdown = Countdown::start(Duration::from_secs(8), Duration::from_secs(1));
        let handle = countdown.handle();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(countdown.remaining(), Duration::from_secs(6));

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(countdown.finished().await, CountdownOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_countdown_elapses_immediately() {
        let countdown = Countdown::start(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(countdown.finished().await, CountdownOutcome::Elapsed);
    }
}
