/*!
Builder de payloads `state.json` de master

Produit le JSON tel que le master le sert, pour alimenter le normalizer, le
poller ou les vues dans les tests.
*/

use serde_json::{json, Map, Value};

pub struct StateBuilder {
    pid: String,
    leader: Option<String>,
    log_dir: Option<String>,
    counters: Map<String, Value>,
    slaves: Vec<Value>,
    frameworks: Vec<Value>,
    completed_frameworks: Vec<Value>,
}

impl StateBuilder {
    /// A master that is its own leader.
    pub fn new<S: Into<String>>(pid: S) -> Self {
        let pid = pid.into();
        Self {
            leader: Some(pid.clone()),
            pid,
            log_dir: None,
            counters: Map::new(),
            slaves: Vec::new(),
            frameworks: Vec::new(),
            completed_frameworks: Vec::new(),
        }
    }

    pub fn leader<S: Into<String>>(mut self, leader: S) -> Self {
        self.leader = Some(leader.into());
        self
    }

    pub fn no_leader(mut self) -> Self {
        self.leader = None;
        self
    }

    pub fn log_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Sets a scalar counter such as `staged_tasks` or `connected_slaves`.
    pub fn counter(mut self, name: &str, value: u64) -> Self {
        self.counters.insert(name.to_string(), json!(value));
        self
    }

    pub fn slave(mut self, id: &str, hostname: &str, cpus: f64, mem: f64) -> Self {
        self.slaves.push(json!({
            "id": id,
            "pid": format!("slave(1)@{}:5051", hostname),
            "hostname": hostname,
            "resources": {"cpus": cpus, "mem": mem}
        }));
        self
    }

    pub fn framework(mut self, id: &str, name: &str, cpus: f64, mem: f64) -> Self {
        self.frameworks.push(json!({
            "id": id,
            "name": name,
            "user": "root",
            "resources": {"cpus": cpus, "mem": mem},
            "tasks": [],
            "completed_tasks": [],
            "offers": []
        }));
        self
    }

    /// Adds a running task to the most recently added framework.
    pub fn task(mut self, id: &str, slave_id: &str) -> Self {
        if let Some(framework) = self.frameworks.last_mut() {
            let framework_id = framework["id"].clone();
            if let Some(tasks) = framework["tasks"].as_array_mut() {
                tasks.push(json!({
                    "id": id,
                    "name": id,
                    "state": "TASK_RUNNING",
                    "framework_id": framework_id,
                    "slave_id": slave_id
                }));
            }
        }
        self
    }

    /// Adds an offer to the framework `framework_id` (which must already be added).
    pub fn offer(mut self, id: &str, framework_id: &str, slave_id: &str, cpus: f64, mem: f64) -> Self {
        let offer = json!({
            "id": id,
            "framework_id": framework_id,
            "slave_id": slave_id,
            "resources": {"cpus": cpus, "mem": mem}
        });
        if let Some(framework) = self.frameworks.iter_mut().find(|f| f["id"] == framework_id) {
            if let Some(offers) = framework["offers"].as_array_mut() {
                offers.push(offer);
            }
        }
        self
    }

    pub fn completed_framework(mut self, id: &str, name: &str) -> Self {
        self.completed_frameworks.push(json!({
            "id": id,
            "name": name,
            "resources": {"cpus": 0.0, "mem": 0.0}
        }));
        self
    }

    pub fn build(self) -> Value {
        let mut state = Map::new();
        state.insert("pid".into(), json!(self.pid));
        state.insert("leader".into(), json!(self.leader.unwrap_or_default()));
        if let Some(dir) = self.log_dir {
            state.insert("log_dir".into(), json!(dir));
        }
        state.extend(self.counters);
        state.insert("slaves".into(), Value::Array(self.slaves));
        state.insert("frameworks".into(), Value::Array(self.frameworks));
        state.insert("completed_frameworks".into(), Value::Array(self.completed_frameworks));
        Value::Object(state)
    }

    /// The payload as the raw text the poller sees.
    pub fn raw(self) -> String {
        self.build().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes_payload() {
        let state = StateBuilder::new("master@m:5050")
            .slave("s1", "h1", 4.0, 1024.0)
            .framework("f1", "spark", 2.0, 512.0)
            .task("t1", "s1")
            .offer("o1", "f1", "s1", 1.0, 128.0)
            .counter("staged_tasks", 2)
            .build();

        assert_eq!(state["leader"], "master@m:5050");
        assert_eq!(state["staged_tasks"], 2);
        assert_eq!(state["frameworks"][0]["offers"][0]["id"], "o1");
        assert_eq!(state["frameworks"][0]["tasks"][0]["framework_id"], "f1");
        assert_eq!(state["slaves"][0]["pid"], "slave(1)@h1:5051");
    }

    #[test]
    fn test_no_leader_is_empty_string() {
        let state = StateBuilder::new("master@m:5050").no_leader().build();
        assert_eq!(state["leader"], "");
    }
}
