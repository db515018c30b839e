//! Table columns of the entities shown by the views

use super::slave::SlaveFrameworkEntry;
use super::table::{Cell, Row};
use webui_core::{Executor, Framework, FrameworkEntry, OfferEntry, Slave, Task};

impl Row for FrameworkEntry {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "max_share" => Some(self.shares.max_share.into()),
            "cpus_share" => Some(self.shares.cpus_share.into()),
            "mem_share" => Some(self.shares.mem_share.into()),
            _ => self.framework.cell(column),
        }
    }
}

impl Row for Framework {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "user" => Some(self.user.as_str().into()),
            "tasks" => Some(self.tasks.len().into()),
            "cpus" => Some(self.resources.cpus.into()),
            "mem" => Some(self.resources.mem.into()),
            _ => None,
        }
    }
}

impl Row for Slave {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(self.id.as_str().into()),
            "hostname" => Some(self.hostname.as_str().into()),
            "cpus" => Some(self.resources.cpus.into()),
            "mem" => Some(self.resources.mem.into()),
            _ => None,
        }
    }
}

impl Row for OfferEntry {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(self.offer.id.as_str().into()),
            "framework" => Some(self.framework_name.as_str().into()),
            "hostname" => Some(self.hostname.as_str().into()),
            "cpus" => Some(self.offer.resources.cpus.into()),
            "mem" => Some(self.offer.resources.mem.into()),
            _ => None,
        }
    }
}

impl Row for Task {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "state" => Some(self.state.as_str().into()),
            "cpus" => Some(self.resources.cpus.into()),
            "mem" => Some(self.resources.mem.into()),
            _ => None,
        }
    }
}

impl Row for Executor {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "tasks" => Some(self.tasks.len().into()),
            "queued" => Some(self.queued_tasks.len().into()),
            "cpus" => Some(self.resources.cpus.into()),
            "mem" => Some(self.resources.mem.into()),
            _ => None,
        }
    }
}

impl Row for SlaveFrameworkEntry {
    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "tasks" => Some(self.num_tasks.into()),
            "cpus" => Some(self.cpus.into()),
            "mem" => Some(self.mem.into()),
            _ => self.framework.cell(column),
        }
    }
}
