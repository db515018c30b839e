//! Single framework page, active or terminated

use super::render_table;
use super::table::Tables;
use webui_core::{Framework, Snapshot, StateHub, Tab};

#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkLookup {
    Active(Framework),
    Terminated(Framework),
    Missing,
}

pub struct FrameworkView {
    pub id: String,
    pub tables: Tables,
    pub lookup: FrameworkLookup,
}

impl FrameworkView {
    pub fn open(hub: &StateHub, id: &str) -> Self {
        hub.set_tab(Tab::Frameworks);
        let mut view = Self {
            id: id.to_string(),
            tables: Tables::default()
                .with("active_tasks", "id")
                .with("completed_tasks", "id"),
            lookup: FrameworkLookup::Missing,
        };
        if let Some(snapshot) = hub.snapshot() {
            view.update(&snapshot);
        }
        view
    }

    /// Re-resolves the framework against a new snapshot.
    pub fn update(&mut self, snapshot: &Snapshot) {
        self.lookup = if let Some(framework) = snapshot.completed_framework(&self.id) {
            FrameworkLookup::Terminated(framework.clone())
        } else if let Some(entry) = snapshot.framework(&self.id) {
            FrameworkLookup::Active(entry.framework.clone())
        } else {
            FrameworkLookup::Missing
        };
    }

    pub fn alert(&self) -> Option<String> {
        match self.lookup {
            FrameworkLookup::Active(_) => None,
            FrameworkLookup::Terminated(_) => Some("This framework has terminated!".into()),
            FrameworkLookup::Missing => Some(format!("No framework found with ID: {}", self.id)),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(alert) = self.alert() {
            out.push_str(&format!("!! {}\n", alert));
        }
        let framework = match &self.lookup {
            FrameworkLookup::Active(f) | FrameworkLookup::Terminated(f) => f,
            FrameworkLookup::Missing => return out,
        };
        out.push_str(&format!(
            "Framework {} ({}) user {} cpus {:.2} mem {:.0}\n",
            framework.id, framework.name, framework.user, framework.resources.cpus, framework.resources.mem
        ));
        let columns = ["id", "name", "state", "cpus", "mem"];
        out.push_str(&render_table(
            "Active Tasks",
            self.tables.get("active_tasks"),
            &framework.tasks,
            &columns,
        ));
        out.push_str(&render_table(
            "Completed Tasks",
            self.tables.get("completed_tasks"),
            &framework.completed_tasks,
            &columns,
        ));
        out
    }
}
