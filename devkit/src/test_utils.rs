/*!
Test Harness pour le noyau de synchro

Facilite l'écriture de tests avec:
- Un `StateHub` frais et un abonné attaché dès la création
- Attente bornée d'événements (`StateUpdated`, bannières, phases)
- Historique de tous les événements observés
*/

use anyhow::Result;
use std::time::Duration;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;
use webui_core::{Banner, StateHub, SyncEvent};

pub struct TestHarness {
    pub hub: StateHub,
    events: Receiver<SyncEvent>,
    seen: Vec<SyncEvent>,
}

impl TestHarness {
    pub fn new() -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let hub = StateHub::new();
        let events = hub.subscribe();
        Self { hub, events, seen: Vec::new() }
    }

    /// Attend le prochain événement qui satisfait `predicate`.
    pub async fn wait_for<F>(&mut self, timeout_ms: u64, mut predicate: F) -> Result<SyncEvent>
    where
        F: FnMut(&SyncEvent) -> bool,
    {
        let deadline = Duration::from_millis(timeout_ms);
        let found = timeout(deadline, async {
            loop {
                match self.events.recv().await {
                    Ok(event) => {
                        self.seen.push(event.clone());
                        if predicate(&event) {
                            return Ok(event);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("harness lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => anyhow::bail!("hub closed"),
                }
            }
        })
        .await;

        match found {
            Ok(result) => result,
            Err(_) => anyhow::bail!("no matching event within {}ms", timeout_ms),
        }
    }

    pub async fn wait_for_update(&mut self, timeout_ms: u64) -> Result<()> {
        self.wait_for(timeout_ms, |event| *event == SyncEvent::StateUpdated).await?;
        Ok(())
    }

    /// Attend qu'une bannière de ce type devienne visible.
    pub async fn wait_for_banner<F>(&mut self, timeout_ms: u64, mut accept: F) -> Result<Banner>
    where
        F: FnMut(&Banner) -> bool,
    {
        let event = self
            .wait_for(timeout_ms, |event| {
                matches!(event, SyncEvent::BannerChanged(Some(banner)) if accept(banner))
            })
            .await?;
        match event {
            SyncEvent::BannerChanged(Some(banner)) => Ok(banner),
            other => anyhow::bail!("unexpected event {:?}", other),
        }
    }

    /// Collecte les événements déjà en attente sans bloquer.
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.seen.push(event.clone());
                    drained.push(event);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("harness lagged, {} events skipped", skipped);
                }
                Err(_) => break,
            }
        }
        drained
    }

    /// Nombre de `StateUpdated` observés jusqu'ici.
    pub fn updates_seen(&mut self) -> usize {
        self.drain();
        self.seen.iter().filter(|e| **e == SyncEvent::StateUpdated).count()
    }

    /// Historique des bannières visibles successives.
    pub fn banners_seen(&mut self) -> Vec<Option<Banner>> {
        self.drain();
        self.seen
            .iter()
            .filter_map(|event| match event {
                SyncEvent::BannerChanged(banner) => Some(banner.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webui_core::Tab;

    #[tokio::test]
    async fn test_wait_for_sees_hub_events() {
        let mut harness = TestHarness::new();
        harness.hub.show_banner(Banner::NoLeader);
        harness.hub.set_tab(Tab::Dashboard);

        let event = harness
            .wait_for(100, |e| matches!(e, SyncEvent::TabChanged(_)))
            .await
            .unwrap();
        assert_eq!(event, SyncEvent::TabChanged(Tab::Dashboard));
        assert_eq!(harness.banners_seen(), vec![Some(Banner::NoLeader)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out() {
        let mut harness = TestHarness::new();
        assert!(harness.wait_for_update(50).await.is_err());
    }
}
