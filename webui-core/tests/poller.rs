//! Poller timing and control flow, driven by paused tokio time.

use std::time::Duration;
use tokio::time::Instant;
use webui_core::{
    Banner, FetchError, Pid, Poller, PollerConfig, PollerExit, SelectionProbe, StateSource,
};
use webui_devkit::{MockStateSource, StateBuilder, TestHarness};

const MASTER: &str = "master@m1:5050";

fn healthy() -> String {
    StateBuilder::new(MASTER)
        .slave("s1", "h1", 4.0, 1024.0)
        .slave("s2", "h2", 4.0, 1024.0)
        .framework("f1", "spark", 2.0, 512.0)
        .offer("o1", "f1", "s1", 1.0, 128.0)
        .raw()
}

fn spawn(
    source: MockStateSource,
    harness: &TestHarness,
) -> (webui_core::PollerHandle, tokio::task::JoinHandle<PollerExit>) {
    let poller = Poller::new(source, harness.hub.clone(), PollerConfig::default());
    let handle = poller.handle();
    (handle, tokio::spawn(poller.run()))
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_polls_at_base_delay_after_each_success() {
    let mut harness = TestHarness::new();
    let source = MockStateSource::new();
    source.always(healthy());

    let (handle, task) = spawn(source.clone(), &harness);
    advance(7000).await;
    handle.shutdown();

    assert_eq!(task.await.unwrap(), PollerExit::Shutdown);
    assert_eq!(source.fetch_gaps_ms(), vec![2000, 2000, 2000]);
    // Identical payloads after the first one publish nothing new.
    assert_eq!(harness.updates_seen(), 1);

    let snapshot = harness.hub.snapshot().unwrap();
    assert_eq!(snapshot.aggregates.total.cpus, 8.0);
    assert_eq!(snapshot.aggregates.used.cpus, 1.0);
    assert_eq!(snapshot.aggregates.idle.cpus, 6.0);
}

#[tokio::test(start_paused = true)]
async fn test_failures_back_off_exponentially() {
    let harness = TestHarness::new();
    let source = MockStateSource::new();
    source.fail_times(3).always(healthy());

    let (handle, task) = spawn(source.clone(), &harness);
    advance(34_000).await;
    handle.shutdown();
    task.await.unwrap();

    // Each failure waits out its countdown (4s, 8s, 16s) plus the 1s retry delay;
    // the first success brings the cadence back to 2s.
    assert_eq!(source.fetch_gaps_ms(), vec![5000, 9000, 17_000, 2000]);
    assert!(harness.hub.banner().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dismissing_error_retries_early_and_resets_backoff() {
    let mut harness = TestHarness::new();
    let source = MockStateSource::new();
    source.fail("connection refused").always(healthy());

    let (handle, task) = spawn(source.clone(), &harness);
    advance(1500).await;
    assert_eq!(
        harness.hub.banner(),
        Some(Banner::FetchError { retry_in: Duration::from_millis(3000) })
    );

    handle.dismiss_error();
    advance(3500).await;
    handle.shutdown();
    task.await.unwrap();

    assert_eq!(source.fetch_gaps_ms(), vec![2500, 2000]);
    let banners = harness.banners_seen();
    assert_eq!(
        banners.first(),
        Some(&Some(Banner::FetchError { retry_in: Duration::from_millis(4000) }))
    );
    assert_eq!(banners.last(), Some(&None));
}

#[tokio::test(start_paused = true)]
async fn test_not_leader_redirects_after_countdown() {
    let harness = TestHarness::new();
    let source = MockStateSource::new();
    source.always(StateBuilder::new(MASTER).leader("master@m2:5050").raw());

    let started = Instant::now();
    let (_handle, task) = spawn(source.clone(), &harness);
    let exit = task.await.unwrap();

    let leader = Pid::parse("master@m2:5050").unwrap();
    assert_eq!(exit, PollerExit::Redirected(leader.clone()));
    assert_eq!(leader.leader_url(), "http://m2:5050");
    assert_eq!(started.elapsed(), Duration::from_millis(6000));
    assert_eq!(source.fetch_count(), 1);
    assert!(harness.hub.snapshot().is_none());
    assert_eq!(
        harness.hub.banner(),
        Some(Banner::NotLeader { leader, redirect_in: Duration::ZERO })
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_is_retried_like_a_transport_error() {
    let harness = TestHarness::new();
    let source = MockStateSource::new();
    source.respond("{\"pid\": ").always(healthy());

    let (handle, task) = spawn(source.clone(), &harness);
    advance(5500).await;
    handle.shutdown();
    task.await.unwrap();

    assert_eq!(source.fetch_gaps_ms(), vec![5000]);
    assert!(harness.hub.snapshot().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_backoff() {
    let harness = TestHarness::new();
    let source = MockStateSource::new();
    source.always_fail("down");

    let (handle, task) = spawn(source.clone(), &harness);
    advance(2500).await;
    handle.shutdown();

    assert_eq!(task.await.unwrap(), PollerExit::Shutdown);
    assert_eq!(source.fetch_count(), 1);
}

/// Source whose responses take a while to arrive.
struct Slow {
    inner: MockStateSource,
    latency: Duration,
}

impl StateSource for Slow {
    async fn fetch(&self) -> Result<String, FetchError> {
        tokio::time::sleep(self.latency).await;
        self.inner.fetch().await
    }

    fn describe(&self) -> String {
        "slow mock".into()
    }
}

#[tokio::test(start_paused = true)]
async fn test_next_poll_is_scheduled_after_completion() {
    let harness = TestHarness::new();
    let inner = MockStateSource::new();
    inner.always(healthy());
    let slow = Slow { inner: inner.clone(), latency: Duration::from_millis(3000) };

    let poller = Poller::new(slow, harness.hub.clone(), PollerConfig::default());
    let handle = poller.handle();
    let task = tokio::spawn(poller.run());

    advance(16_500).await;
    handle.shutdown();
    task.await.unwrap();

    // Responses land at 3s, 8s, 13s, 18s: every gap is latency + base delay.
    // Shutdown is only seen between cycles, so the fetch in flight at 16.5s completes.
    assert_eq!(inner.fetch_gaps_ms(), vec![5000, 5000, 5000]);
}

#[tokio::test(start_paused = true)]
async fn test_following_the_leader_clears_not_leader_banner() {
    let harness = TestHarness::new();
    let stale = MockStateSource::new();
    stale.always(StateBuilder::new(MASTER).leader("master@m2:5050").raw());

    let (_handle, task) = spawn(stale, &harness);
    let leader = match task.await.unwrap() {
        PollerExit::Redirected(leader) => leader,
        other => panic!("unexpected exit {:?}", other),
    };
    assert!(matches!(harness.hub.banner(), Some(Banner::NotLeader { .. })));

    let current = MockStateSource::new();
    current.always(StateBuilder::new(leader.to_string()).slave("s1", "h1", 4.0, 1024.0).raw());
    let (handle, task) = spawn(current.clone(), &harness);
    advance(500).await;
    handle.shutdown();
    task.await.unwrap();

    assert_eq!(current.fetch_count(), 1);
    assert_eq!(harness.hub.banner(), None);
    assert_eq!(harness.hub.snapshot().unwrap().pid, leader);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_sent_during_fetch_does_not_skip_backoff() {
    let harness = TestHarness::new();
    let inner = MockStateSource::new();
    inner.fail("connection reset").always(healthy());
    let slow = Slow { inner: inner.clone(), latency: Duration::from_millis(3000) };

    let poller = Poller::new(slow, harness.hub.clone(), PollerConfig::default());
    let handle = poller.handle();
    let task = tokio::spawn(poller.run());

    // Pressed while the first fetch is still in flight, before any error.
    advance(1000).await;
    handle.dismiss_error();

    // The fetch fails at 3s; its countdown must still be running at 4.5s.
    advance(3500).await;
    assert_eq!(
        harness.hub.banner(),
        Some(Banner::FetchError { retry_in: Duration::from_millis(3000) })
    );

    advance(7500).await;
    handle.shutdown();
    task.await.unwrap();

    // 4s countdown + 1s retry delay + 3s latency of the second fetch.
    assert_eq!(inner.fetch_gaps_ms(), vec![8000]);
}

/// A UI that always has some text selected.
struct Selecting;

impl SelectionProbe for Selecting {
    fn has_selected_text(&self) -> bool {
        true
    }
}

#[tokio::test(start_paused = true)]
async fn test_selection_holds_updates_for_grace_period() {
    let mut harness = TestHarness::new();
    let source = MockStateSource::new();
    source.always(healthy());

    let poller = Poller::new(source.clone(), harness.hub.clone(), PollerConfig::default())
        .with_selection(Box::new(Selecting));
    let handle = poller.handle();
    let task = tokio::spawn(poller.run());

    // Fetches at 0s..16s each add 2s; 18s of accumulated delay is below the grace.
    advance(17_000).await;
    assert_eq!(source.fetch_count(), 9);
    assert!(harness.hub.snapshot().is_none());
    assert_eq!(harness.updates_seen(), 0);

    // The fetch at 18s brings it to 20s and is let through.
    advance(2000).await;
    handle.shutdown();
    task.await.unwrap();

    assert!(harness.hub.snapshot().is_some());
    assert_eq!(harness.updates_seen(), 1);
    assert_eq!(source.fetch_gaps_ms(), vec![2000; 9]);
}
