//! Slave page: the slave's own state, its frameworks and executors
//!
//! The slave is looked up in the master snapshot, then its `state.json` is
//! fetched from the slave itself. Framework and executor ids given on the
//! page narrow the view down further.

use super::pailer::LogLink;
use super::render_table;
use super::table::Tables;
use anyhow::Result;
use std::collections::BTreeMap;
use tracing::warn;
use webui_core::{Executor, Framework, JsonFetcher, Pid, SlaveState, Snapshot, StateHub, Tab};

/// A framework as seen by one slave, with executors keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaveFrameworkEntry {
    pub framework: Framework,
    pub executors: BTreeMap<String, Executor>,
    pub completed_executors: BTreeMap<String, Executor>,
    /// Σ tasks over live executors.
    pub num_tasks: usize,
    pub cpus: f64,
    pub mem: f64,
}

impl SlaveFrameworkEntry {
    fn new(framework: Framework) -> Self {
        let executors: BTreeMap<String, Executor> = framework
            .executors
            .iter()
            .map(|e| (e.id.clone(), e.clone()))
            .collect();
        let completed_executors = framework
            .completed_executors
            .iter()
            .map(|e| (e.id.clone(), e.clone()))
            .collect();

        let mut entry = Self {
            framework,
            executors,
            completed_executors,
            num_tasks: 0,
            cpus: 0.0,
            mem: 0.0,
        };
        for executor in entry.executors.values() {
            entry.num_tasks += executor.tasks.len();
            entry.cpus += executor.resources.cpus;
            entry.mem += executor.resources.mem;
        }
        entry
    }

    pub fn executor(&self, id: &str) -> Option<&Executor> {
        self.executors.get(id).or_else(|| self.completed_executors.get(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlaveDetail {
    pub state: SlaveState,
    pub frameworks: BTreeMap<String, SlaveFrameworkEntry>,
    pub completed_frameworks: BTreeMap<String, SlaveFrameworkEntry>,
}

impl SlaveDetail {
    pub fn from_state(state: SlaveState) -> Self {
        let frameworks = state
            .frameworks
            .iter()
            .map(|f| (f.id.clone(), SlaveFrameworkEntry::new(f.clone())))
            .collect();
        let completed_frameworks = state
            .completed_frameworks
            .iter()
            .map(|f| (f.id.clone(), SlaveFrameworkEntry::new(f.clone())))
            .collect();
        Self { state, frameworks, completed_frameworks }
    }

    pub fn framework(&self, id: &str) -> Option<&SlaveFrameworkEntry> {
        self.frameworks.get(id).or_else(|| self.completed_frameworks.get(id))
    }
}

pub struct SlaveView {
    pub slave_id: String,
    pub framework_id: Option<String>,
    pub executor_id: Option<String>,
    pub tables: Tables,
    pub host: Option<String>,
    pub detail: Option<SlaveDetail>,
    pub alert: Option<String>,
}

impl SlaveView {
    pub fn open(
        hub: &StateHub,
        slave_id: &str,
        framework_id: Option<&str>,
        executor_id: Option<&str>,
    ) -> Self {
        hub.set_tab(Tab::Slaves);
        Self {
            slave_id: slave_id.to_string(),
            framework_id: framework_id.map(str::to_string),
            executor_id: executor_id.map(str::to_string),
            tables: Tables::default()
                .with("frameworks", "id")
                .with("completed_frameworks", "id")
                .with("executors", "id")
                .with("completed_executors", "id")
                .with("tasks", "id")
                .with("queued_tasks", "id")
                .with("completed_tasks", "id"),
            host: None,
            detail: None,
            alert: None,
        }
    }

    /// Refreshes the page from `snapshot`, fetching the slave's own state.
    pub async fn update<F: JsonFetcher>(&mut self, snapshot: &Snapshot, fetcher: &F) {
        self.alert = None;
        let Some(slave) = snapshot.slave(&self.slave_id) else {
            self.alert = Some(format!("No slave found with ID: {}", self.slave_id));
            return;
        };
        let pid = match Pid::parse(&slave.pid) {
            Ok(pid) => pid,
            Err(e) => {
                self.alert = Some(format!("Invalid pid for slave {}: {}", self.slave_id, e));
                return;
            }
        };
        self.host = Some(pid.host.clone());

        match fetcher.fetch_json::<SlaveState>(&pid.state_url(), &[]).await {
            Ok(state) => {
                self.detail = Some(SlaveDetail::from_state(state));
                self.alert = self.lookup_alert();
            }
            Err(e) => {
                warn!("failed to fetch state of slave {}: {}", self.slave_id, e);
                self.alert = Some(format!("Error fetching state of slave: {}", self.slave_id));
            }
        }
    }

    fn lookup_alert(&self) -> Option<String> {
        let framework_id = self.framework_id.as_deref()?;
        let Some(framework) = self.framework() else {
            return Some(format!("No framework found with ID: {}", framework_id));
        };
        let executor_id = self.executor_id.as_deref()?;
        match framework.executor(executor_id) {
            Some(_) => None,
            None => Some(format!("No executor found with ID: {}", executor_id)),
        }
    }

    pub fn framework(&self) -> Option<&SlaveFrameworkEntry> {
        let id = self.framework_id.as_deref()?;
        self.detail.as_ref()?.framework(id)
    }

    pub fn executor(&self) -> Option<&Executor> {
        let id = self.executor_id.as_deref()?;
        self.framework()?.executor(id)
    }

    pub fn log(&self) -> Result<LogLink> {
        let log_dir = self.detail.as_ref().and_then(|d| d.state.log_dir.as_deref());
        match &self.host {
            Some(host) => LogLink::for_process(log_dir, host, "/slave/log", "Mesos Slave"),
            None => Ok(LogLink::NoLogDir),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(alert) = &self.alert {
            out.push_str(&format!("!! {}\n", alert));
        }
        let Some(detail) = &self.detail else {
            return out;
        };

        if let Some(executor) = self.executor() {
            let columns = ["id", "name", "state", "cpus", "mem"];
            out.push_str(&format!("Executor {} ({})\n", executor.id, executor.directory));
            out.push_str(&render_table("Tasks", self.tables.get("tasks"), &executor.tasks, &columns));
            out.push_str(&render_table(
                "Queued Tasks",
                self.tables.get("queued_tasks"),
                &executor.queued_tasks,
                &columns,
            ));
            out.push_str(&render_table(
                "Completed Tasks",
                self.tables.get("completed_tasks"),
                &executor.completed_tasks,
                &columns,
            ));
        } else if let Some(framework) = self.framework() {
            let columns = ["id", "name", "tasks", "queued", "cpus", "mem"];
            out.push_str(&format!("Framework {} on slave {}\n", framework.framework.id, self.slave_id));
            out.push_str(&render_table(
                "Executors",
                self.tables.get("executors"),
                framework.executors.values(),
                &columns,
            ));
            out.push_str(&render_table(
                "Completed Executors",
                self.tables.get("completed_executors"),
                framework.completed_executors.values(),
                &columns,
            ));
        } else {
            let columns = ["id", "name", "user", "tasks", "cpus", "mem"];
            out.push_str(&format!("Slave {} ({})\n", self.slave_id, detail.state.hostname));
            out.push_str(&render_table(
                "Frameworks",
                self.tables.get("frameworks"),
                detail.frameworks.values(),
                &columns,
            ));
            out.push_str(&render_table(
                "Completed Frameworks",
                self.tables.get("completed_frameworks"),
                detail.completed_frameworks.values(),
                &columns,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use webui_core::{FetchError, Normalizer};
    use webui_devkit::StateBuilder;

    /// Serves one canned document for any URL and remembers the last URL.
    struct Canned {
        body: Option<Value>,
        last_url: Mutex<Option<String>>,
    }

    impl JsonFetcher for Canned {
        async fn fetch_json<T>(&self, url: &str, _query: &[(&str, &str)]) -> Result<T, FetchError>
        where
            T: DeserializeOwned + Send,
        {
            *self.last_url.lock().unwrap() = Some(url.to_string());
            match &self.body {
                Some(body) => serde_json::from_value(body.clone())
                    .map_err(|e| FetchError::Unavailable(e.to_string())),
                None => Err(FetchError::Unavailable("slave down".into())),
            }
        }
    }

    fn snapshot() -> std::sync::Arc<Snapshot> {
        let hub = StateHub::new();
        Normalizer::new(hub.clone())
            .normalize(
                &StateBuilder::new("master@m:5050").slave("s1", "h1", 4.0, 1024.0).raw(),
                std::time::Duration::ZERO,
            )
            .unwrap();
        hub.snapshot().unwrap()
    }

    fn slave_state() -> Value {
        json!({
            "id": "s1",
            "hostname": "h1",
            "log_dir": "/var/log/mesos",
            "frameworks": [{
                "id": "f1", "name": "spark",
                "executors": [
                    {"id": "e1", "resources": {"cpus": 1.0, "mem": 128.0},
                     "tasks": [{"id": "t1"}, {"id": "t2"}]},
                    {"id": "e2", "resources": {"cpus": 0.5, "mem": 64.0}, "tasks": [{"id": "t3"}]}
                ],
                "completed_executors": [{"id": "e0", "resources": {"cpus": 9.0, "mem": 9.0}}]
            }],
            "completed_frameworks": [{"id": "f0", "name": "old"}]
        })
    }

    fn fetcher(body: Option<Value>) -> Canned {
        Canned { body, last_url: Default::default() }
    }

    #[tokio::test]
    async fn test_framework_stats_over_live_executors() {
        let hub = StateHub::new();
        let mut view = SlaveView::open(&hub, "s1", None, None);
        let canned = fetcher(Some(slave_state()));
        view.update(&snapshot(), &canned).await;

        assert_eq!(
            canned.last_url.lock().unwrap().as_deref(),
            Some("http://h1:5051/slave(1)/state.json")
        );
        assert_eq!(view.alert, None);
        let detail = view.detail.as_ref().unwrap();
        let f1 = &detail.frameworks["f1"];
        assert_eq!(f1.num_tasks, 3);
        assert_eq!(f1.cpus, 1.5);
        assert_eq!(f1.mem, 192.0);
        assert!(detail.completed_frameworks.contains_key("f0"));
        assert!(view.render().contains("== Frameworks (1)"));
    }

    #[tokio::test]
    async fn test_framework_and_executor_lookup() {
        let hub = StateHub::new();
        let canned = fetcher(Some(slave_state()));

        let mut view = SlaveView::open(&hub, "s1", Some("f1"), Some("e0"));
        view.update(&snapshot(), &canned).await;
        assert_eq!(view.alert, None);
        assert_eq!(view.executor().unwrap().id, "e0");

        let mut view = SlaveView::open(&hub, "s1", Some("f0"), None);
        view.update(&snapshot(), &canned).await;
        assert_eq!(view.framework().unwrap().framework.name, "old");

        let mut view = SlaveView::open(&hub, "s1", Some("f1"), Some("e9"));
        view.update(&snapshot(), &canned).await;
        assert_eq!(view.alert.as_deref(), Some("No executor found with ID: e9"));

        let mut view = SlaveView::open(&hub, "s1", Some("f9"), Some("e1"));
        view.update(&snapshot(), &canned).await;
        assert_eq!(view.alert.as_deref(), Some("No framework found with ID: f9"));
    }

    #[tokio::test]
    async fn test_unknown_slave_and_fetch_failure() {
        let hub = StateHub::new();

        let mut view = SlaveView::open(&hub, "s9", None, None);
        view.update(&snapshot(), &fetcher(Some(slave_state()))).await;
        assert_eq!(view.alert.as_deref(), Some("No slave found with ID: s9"));
        assert_eq!(hub.tab(), Tab::Slaves);

        let mut view = SlaveView::open(&hub, "s1", None, None);
        view.update(&snapshot(), &fetcher(None)).await;
        assert_eq!(view.alert.as_deref(), Some("Error fetching state of slave: s1"));
        assert!(view.detail.is_none());
    }

    #[tokio::test]
    async fn test_slave_log_link() {
        let hub = StateHub::new();
        let mut view = SlaveView::open(&hub, "s1", None, None);
        view.update(&snapshot(), &fetcher(Some(slave_state()))).await;
        match view.log().unwrap() {
            LogLink::Pailer(req) => assert_eq!(req.window_title, "Mesos Slave (h1:5051)"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
