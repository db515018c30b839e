use super::render_table;
use super::table::Tables;
use webui_core::{Snapshot, StateHub, Tab};

pub struct FrameworksView {
    pub tables: Tables,
}

impl FrameworksView {
    pub fn open(hub: &StateHub) -> Self {
        hub.set_tab(Tab::Frameworks);
        Self { tables: Tables::default().with("frameworks", "id") }
    }

    pub fn render(&self, snapshot: &Snapshot) -> String {
        render_table(
            "Frameworks",
            self.tables.get("frameworks"),
            snapshot.frameworks.values(),
            &["id", "name", "user", "tasks", "cpus", "mem", "cpus_share", "mem_share", "max_share"],
        )
    }
}
