use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::warn;
use webui_core::PollerConfig;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WebuiConfig {
    pub master: MasterConf,
    pub polling: PollingConf,
    pub console: ConsoleConf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MasterConf {
    pub url: String,
    pub state_path: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PollingConf {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub tick_ms: u64,
    pub redirect_countdown_ms: u64,
    pub selection_grace_ms: u64,
    pub min_retry_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConsoleConf {
    /// Re-target the poller at the leader after a redirect instead of exiting.
    pub follow_leader: bool,
}

impl Default for MasterConf {
    fn default() -> Self {
        Self {
            url: "http://localhost:5050".into(),
            state_path: "master/state.json".into(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for PollingConf {
    fn default() -> Self {
        Self {
            base_delay_ms: 2000,
            max_delay_ms: 128_000,
            tick_ms: 1000,
            redirect_countdown_ms: 6000,
            selection_grace_ms: 20_000,
            min_retry_ms: 1000,
        }
    }
}

impl Default for ConsoleConf {
    fn default() -> Self {
        Self { follow_leader: true }
    }
}

impl MasterConf {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PollingConf {
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            tick: Duration::from_millis(self.tick_ms),
            redirect_countdown: Duration::from_millis(self.redirect_countdown_ms),
            selection_grace: Duration::from_millis(self.selection_grace_ms),
            min_retry: Duration::from_millis(self.min_retry_ms),
        }
    }
}

pub async fn load_config() -> WebuiConfig {
    let path = std::env::var("WEBUI_CONFIG").unwrap_or_else(|_| "webui.yaml".into());
    let mut cfg = load_config_from(&path).await;
    if let Ok(url) = std::env::var("WEBUI_MASTER_URL") {
        cfg.master.url = url;
    }
    cfg
}

pub async fn load_config_from(path: &str) -> WebuiConfig {
    if !Path::new(path).exists() {
        warn!("no {} found, using default config", path);
        return WebuiConfig::default();
    }
    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return WebuiConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!("invalid config {}: {}", path, e);
        WebuiConfig::default()
    })
}
