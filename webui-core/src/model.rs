//! Wire model of the master (and slave) `state.json` payloads
//!
//! Only the fields the dashboard reads are modelled; unknown fields are
//! ignored. Missing collections decode as empty, missing counters as zero.

use serde::{Deserialize, Serialize};

/// Resource vector carried by slaves, frameworks, offers, executors and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub cpus: f64,
    #[serde(default)]
    pub mem: f64,
}

impl std::ops::AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        self.cpus += rhs.cpus;
        self.mem += rhs.mem;
    }
}

impl std::ops::SubAssign for Resources {
    fn sub_assign(&mut self, rhs: Self) {
        self.cpus -= rhs.cpus;
        self.mem -= rhs.mem;
    }
}

/// Master `state.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterState {
    pub pid: String,
    /// Empty or absent while no leader is elected.
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,

    #[serde(default)]
    pub staged_tasks: u64,
    #[serde(default)]
    pub started_tasks: u64,
    #[serde(default)]
    pub finished_tasks: u64,
    #[serde(default)]
    pub killed_tasks: u64,
    #[serde(default)]
    pub failed_tasks: u64,
    #[serde(default)]
    pub lost_tasks: u64,

    #[serde(default)]
    pub activated_slaves: u64,
    #[serde(default)]
    pub connected_slaves: u64,

    #[serde(default)]
    pub slaves: Vec<Slave>,
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub completed_frameworks: Vec<Framework>,
}

impl MasterState {
    /// The elected leader, if any. An empty string counts as "no leader".
    pub fn elected_leader(&self) -> Option<&str> {
        self.leader.as_deref().filter(|leader| !leader.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slave {
    pub id: String,
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub completed_tasks: Vec<Task>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    /// Only present in a slave's own state.
    #[serde(default)]
    pub executors: Vec<Executor>,
    #[serde(default)]
    pub completed_executors: Vec<Executor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub framework_id: String,
    pub slave_id: String,
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub framework_id: String,
    #[serde(default)]
    pub slave_id: String,
    #[serde(default)]
    pub executor_id: String,
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub queued_tasks: Vec<Task>,
    #[serde(default)]
    pub completed_tasks: Vec<Task>,
}

/// A slave's own `state.json`, fetched on demand by the slave view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaveState {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub completed_frameworks: Vec<Framework>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let state: MasterState = serde_json::from_str(r#"{"pid": "master@h:5050"}"#).unwrap();
        assert!(state.slaves.is_empty());
        assert_eq!(state.staged_tasks, 0);
        assert_eq!(state.elected_leader(), None);
    }

    #[test]
    fn test_empty_leader_is_no_leader() {
        let state: MasterState =
            serde_json::from_str(r#"{"pid": "master@h:5050", "leader": ""}"#).unwrap();
        assert_eq!(state.elected_leader(), None);
    }

    #[test]
    fn test_resources_arithmetic() {
        let mut total = Resources { cpus: 4.0, mem: 1024.0 };
        total += Resources { cpus: 2.0, mem: 512.0 };
        total -= Resources { cpus: 1.0, mem: 256.0 };
        assert_eq!(total, Resources { cpus: 5.0, mem: 1280.0 });
    }
}
