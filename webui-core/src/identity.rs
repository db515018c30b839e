//! Process identity of masters and slaves (`id@host:port`)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PidError {
    #[error("missing '@' separator in pid: {0}")]
    MissingSeparator(String),
    #[error("empty id in pid: {0}")]
    EmptyId(String),
    #[error("empty host in pid: {0}")]
    EmptyHost(String),
}

/// Structured process identity. `host` keeps the port (`10.0.0.1:5050`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    pub id: String,
    pub host: String,
}

impl Pid {
    pub fn parse(raw: &str) -> Result<Self, PidError> {
        let (id, host) = raw
            .split_once('@')
            .ok_or_else(|| PidError::MissingSeparator(raw.to_string()))?;
        if id.is_empty() {
            return Err(PidError::EmptyId(raw.to_string()));
        }
        if host.is_empty() {
            return Err(PidError::EmptyHost(raw.to_string()));
        }
        Ok(Self { id: id.to_string(), host: host.to_string() })
    }

    /// Address a browser would navigate to for this process.
    pub fn leader_url(&self) -> String {
        format!("http://{}", self.host)
    }

    /// The process' own state endpoint.
    pub fn state_url(&self) -> String {
        format!("http://{}/{}/state.json", self.host, self.id)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.host)
    }
}

impl FromStr for Pid {
    type Err = PidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pid::parse(s)
    }
}

impl Serialize for Pid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pid::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_master_pid() {
        let pid = Pid::parse("master@10.0.0.1:5050").unwrap();
        assert_eq!(pid.id, "master");
        assert_eq!(pid.host, "10.0.0.1:5050");
        assert_eq!(pid.to_string(), "master@10.0.0.1:5050");
        assert_eq!(pid.leader_url(), "http://10.0.0.1:5050");
    }

    #[test]
    fn test_parse_splits_on_first_separator() {
        let pid = Pid::parse("slave(1)@host@odd:5051").unwrap();
        assert_eq!(pid.id, "slave(1)");
        assert_eq!(pid.host, "host@odd:5051");
        assert_eq!(
            Pid::parse("slave(1)@10.0.0.2:5051").unwrap().state_url(),
            "http://10.0.0.2:5051/slave(1)/state.json"
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(Pid::parse("master"), Err(PidError::MissingSeparator(_))));
        assert!(matches!(Pid::parse("@host:1"), Err(PidError::EmptyId(_))));
        assert!(matches!(Pid::parse("master@"), Err(PidError::EmptyHost(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let pid: Pid = serde_json::from_str("\"master@h:5050\"").unwrap();
        assert_eq!(serde_json::to_string(&pid).unwrap(), "\"master@h:5050\"");
        assert!(serde_json::from_str::<Pid>("\"nohost\"").is_err());
    }
}
