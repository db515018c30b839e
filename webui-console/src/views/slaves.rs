use super::render_table;
use super::table::Tables;
use webui_core::{Snapshot, StateHub, Tab};

pub struct SlavesView {
    pub tables: Tables,
}

impl SlavesView {
    pub fn open(hub: &StateHub) -> Self {
        hub.set_tab(Tab::Slaves);
        Self { tables: Tables::default().with("slaves", "id") }
    }

    pub fn render(&self, snapshot: &Snapshot) -> String {
        render_table(
            "Slaves",
            self.tables.get("slaves"),
            snapshot.slaves.values(),
            &["id", "hostname", "cpus", "mem"],
        )
    }
}
