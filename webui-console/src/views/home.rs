use super::pailer::LogLink;
use super::render_table;
use super::table::Tables;
use anyhow::Result;
use std::fmt::Write;
use webui_core::{Snapshot, StateHub, Tab};

pub struct HomeView {
    pub tables: Tables,
}

impl HomeView {
    pub fn open(hub: &StateHub) -> Self {
        hub.set_tab(Tab::Home);
        Self {
            tables: Tables::default()
                .with("frameworks", "id")
                .with("slaves", "id")
                .with("offers", "id")
                .with("completed_frameworks", "id"),
        }
    }

    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = summary(snapshot);
        out.push_str(&render_table(
            "Active Frameworks",
            self.tables.get("frameworks"),
            snapshot.frameworks.values(),
            &["id", "name", "user", "tasks", "cpus", "mem", "max_share"],
        ));
        out.push_str(&render_table(
            "Slaves",
            self.tables.get("slaves"),
            snapshot.slaves.values(),
            &["id", "hostname", "cpus", "mem"],
        ));
        out.push_str(&render_table(
            "Offers",
            self.tables.get("offers"),
            snapshot.offers.values(),
            &["id", "framework", "hostname", "cpus", "mem"],
        ));
        out.push_str(&render_table(
            "Terminated Frameworks",
            self.tables.get("completed_frameworks"),
            snapshot.completed_frameworks.values(),
            &["id", "name", "user", "cpus", "mem"],
        ));
        out
    }

    /// The master's own log, reachable at the address it reports for itself.
    pub fn log(&self, snapshot: &Snapshot) -> Result<LogLink> {
        LogLink::for_process(
            snapshot.log_dir.as_deref(),
            &snapshot.pid.host,
            "/master/log",
            "Mesos Master",
        )
    }
}

pub fn summary(snapshot: &Snapshot) -> String {
    let agg = &snapshot.aggregates;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cluster: {}  Master: {}  Leader: {}",
        snapshot.cluster.as_deref().unwrap_or("(unnamed)"),
        snapshot.pid,
        snapshot.leader.as_ref().map(|l| l.to_string()).unwrap_or_else(|| "(none)".into()),
    );
    let _ = writeln!(
        out,
        "Slaves: {} activated, {} connected",
        snapshot.activated_slaves, snapshot.connected_slaves
    );
    let _ = writeln!(
        out,
        "Tasks: staged {} started {} finished {} killed {} failed {} lost {} | active {} completed {}",
        snapshot.staged_tasks,
        snapshot.started_tasks,
        snapshot.finished_tasks,
        snapshot.killed_tasks,
        snapshot.failed_tasks,
        snapshot.lost_tasks,
        snapshot.active_tasks,
        snapshot.completed_tasks,
    );
    let _ = writeln!(
        out,
        "CPUs: total {:.2} used {:.2} offered {:.2} idle {:.2}",
        agg.total.cpus, agg.used.cpus, agg.offered.cpus, agg.idle.cpus
    );
    let _ = writeln!(
        out,
        "Mem:  total {:.0} used {:.0} offered {:.0} idle {:.0} MB",
        agg.total.mem, agg.used.mem, agg.offered.mem, agg.idle.mem
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use webui_core::Normalizer;
    use webui_devkit::StateBuilder;

    fn snapshot(builder: StateBuilder) -> std::sync::Arc<Snapshot> {
        let hub = StateHub::new();
        Normalizer::new(hub.clone())
            .normalize(&builder.raw(), std::time::Duration::ZERO)
            .unwrap();
        hub.snapshot().unwrap()
    }

    #[test]
    fn test_home_sets_tab_and_renders_tables() {
        let hub = StateHub::new();
        hub.set_tab(Tab::Slaves);
        let view = HomeView::open(&hub);
        assert_eq!(hub.tab(), Tab::Home);

        let snap = snapshot(
            StateBuilder::new("master@m:5050")
                .slave("s1", "h1", 4.0, 1024.0)
                .framework("f1", "spark", 2.0, 512.0)
                .offer("o1", "f1", "s1", 1.0, 128.0),
        );
        let out = view.render(&snap);
        assert!(out.contains("CPUs: total 4.00 used 1.00 offered 1.00 idle 2.00"));
        assert!(out.contains("== Offers (1)"));
        assert!(out.contains("o1\tspark\th1\t1\t128"));
    }

    #[test]
    fn test_master_log_link() {
        let view = HomeView::open(&StateHub::new());
        let without = snapshot(StateBuilder::new("master@m:5050"));
        assert_eq!(view.log(&without).unwrap(), LogLink::NoLogDir);

        let with = snapshot(StateBuilder::new("master@m:5050").log_dir("/var/log/mesos"));
        match view.log(&with).unwrap() {
            LogLink::Pailer(req) => {
                assert_eq!(req.host, "m:5050");
                assert_eq!(req.window_title, "Mesos Master (m:5050)");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
