//! Cluster WebUI Console - terminal dashboard of a cluster master
//!
//! Polls the master's `state.json`, keeps a normalized snapshot in the hub
//! and renders the dashboard pages on every update:
//! - Exponential backoff with a dismissable retry countdown
//! - Redirect to the elected leader when the polled master is not leading
//! - Home / frameworks / slaves / browse / dashboard pages driven from stdin

mod config;
mod console;
mod views;

use anyhow::{Context, Result};
use console::{banner_text, Command, Page, Route};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use views::dashboard::DashboardSeries;
use views::pailer::LogLink;
use webui_core::state::{new_state, Shared};
use webui_core::{
    HttpJsonFetcher, HttpStateSource, Poller, PollerExit, PollerHandle, StateHub, SyncEvent,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("webui_console=info,webui_core=info")),
        )
        .init();

    let cfg = config::load_config().await;
    info!("Starting Cluster WebUI Console against {}", cfg.master.url);

    let hub = StateHub::new();
    let poller: Shared<Option<PollerHandle>> = new_state(None);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();

    spawn_stdin_reader(commands_tx);
    spawn_ctrl_c(poller.clone());
    let ui = tokio::spawn(run_ui(
        hub.clone(),
        HttpJsonFetcher::new(cfg.master.timeout()),
        poller.clone(),
        commands_rx,
    ));

    let mut master_url = cfg.master.url.clone();
    loop {
        let source = HttpStateSource::new(&master_url, &cfg.master.state_path, cfg.master.timeout())
            .with_context(|| format!("invalid master url {}", master_url))?;
        let task = Poller::new(source, hub.clone(), cfg.polling.poller_config());
        *poller.lock() = Some(task.handle());

        match task.run().await {
            PollerExit::Shutdown => break,
            PollerExit::Redirected(leader) if cfg.console.follow_leader => {
                master_url = leader.leader_url();
                info!("following leader {}", master_url);
            }
            PollerExit::Redirected(leader) => {
                warn!("master is not the leader, leader is {}", leader);
                break;
            }
        }
    }

    ui.abort();
    info!("Cluster WebUI Console stopped");
    Ok(())
}

fn spawn_ctrl_c(poller: Shared<Option<PollerHandle>>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            if let Some(handle) = poller.lock().as_ref() {
                handle.shutdown();
            }
        }
    });
}

fn spawn_stdin_reader(commands: mpsc::UnboundedSender<Command>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Ok(cmd) => {
                    if commands.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
    });
}

/// Owns the current page: re-renders it on every new snapshot and applies
/// user commands.
async fn run_ui(
    hub: StateHub,
    fetcher: HttpJsonFetcher,
    poller: Shared<Option<PollerHandle>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut events = hub.subscribe();
    let mut page = Page::open(&Route::Home, &hub);
    let mut series = DashboardSeries::default();

    loop {
        let redraw = tokio::select! {
            event = events.recv() => match event {
                Ok(SyncEvent::StateUpdated) => {
                    if let Some(snapshot) = hub.snapshot() {
                        series.record(&snapshot);
                    }
                    true
                }
                Ok(SyncEvent::BannerChanged(Some(banner))) => {
                    warn!("{}", banner_text(&banner));
                    false
                }
                Ok(_) => false,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("ui lagged behind by {} events", n);
                    true
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            command = commands.recv() => match command {
                None => break,
                Some(Command::Quit) => {
                    if let Some(handle) = poller.lock().as_ref() {
                        handle.shutdown();
                    }
                    false
                }
                Some(Command::Retry) => {
                    if let Some(handle) = poller.lock().as_ref() {
                        handle.dismiss_error();
                    }
                    false
                }
                Some(Command::Open(route)) => {
                    page = Page::open(&route, &hub);
                    true
                }
                Some(Command::Sort { table, column }) => {
                    match page.tables_mut() {
                        Some(tables) => tables.select_column(&table, &column),
                        None => warn!("this page has no sortable tables"),
                    }
                    true
                }
                Some(Command::Log) => {
                    if let Some(snapshot) = hub.snapshot() {
                        match page.log(&snapshot) {
                            Ok(Some(LogLink::Pailer(req))) => println!("{}: {}", req.window_title, req.url),
                            Ok(Some(LogLink::NoLogDir)) => warn!("Log file unavailable"),
                            Ok(None) => warn!("this page has no log"),
                            Err(e) => error!("cannot open log: {:#}", e),
                        }
                    }
                    false
                }
            },
        };

        if redraw {
            if let Some(snapshot) = hub.snapshot() {
                println!("{}", page.render(&snapshot, &fetcher, &series).await);
            }
        }
    }
}
