//! Remote agents and their periodic sync reports

use crate::storage::Entity;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health reported by an agent on its last sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Never synced
    #[default]
    Unknown,
    /// Agent reports everything running
    Healthy,
    /// Agent is running with reduced functionality
    Degraded,
    /// Agent reported it is going offline
    Offline,
}

/// One state report ("sync"/heartbeat) received from an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Reported health
    pub status: AgentStatus,
    /// Agent software version at report time
    pub version: String,
    /// Free-form state payload
    pub report: serde_json::Value,
    /// When the report was received
    pub at: Timestamp,
}

/// A managed agent in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identifier
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Platform the agent runs on, e.g. `kubernetes` or `linux`
    pub platform: String,
    /// Last reported software version
    pub version: String,
    /// Operator-assigned labels
    pub labels: BTreeMap<String, String>,
    /// Health from the last sync
    pub status: AgentStatus,
    /// Time of the last sync, if any
    pub last_seen_at: Option<Timestamp>,
    /// Payload of the last sync
    pub last_report: serde_json::Value,
    /// Number of syncs received
    pub sync_count: u64,
    /// Registration time
    pub created_at: Timestamp,
    /// Last modification time
    pub updated_at: Timestamp,
}

impl Agent {
    /// Create a newly registered agent
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform: impl Into<String>, at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: platform.into(),
            version: String::new(),
            labels: BTreeMap::new(),
            status: AgentStatus::Unknown,
            last_seen_at: None,
            last_report: serde_json::Value::Null,
            sync_count: 0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Builder-style label assignment for freshly constructed agents
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Apply a sync report
    pub fn record_sync(&mut self, report: SyncReport) {
        self.status = report.status;
        if !report.version.is_empty() {
            self.version = report.version;
        }
        self.last_report = report.report;
        self.last_seen_at = Some(report.at);
        self.sync_count += 1;
        self.updated_at = report.at.advance_past(self.updated_at);
    }

    /// Set a label
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>, at: Timestamp) {
        self.labels.insert(key.into(), value.into());
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Remove a label, returning its previous value
    pub fn remove_label(&mut self, key: &str, at: Timestamp) -> Option<String> {
        let prev = self.labels.remove(key);
        if prev.is_some() {
            self.updated_at = at.advance_past(self.updated_at);
        }
        prev
    }

    /// Label value for `key`
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Update last modification time
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at.advance_past(self.updated_at);
    }
}

impl Entity for Agent {
    const KIND: &'static str = "agent";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sync_updates_state() {
        let mut agent = Agent::new("a1", "edge-1", "linux", Timestamp::from_millis(1));
        agent.record_sync(SyncReport {
            status: AgentStatus::Healthy,
            version: "1.4.2".into(),
            report: serde_json::json!({"pods": 3}),
            at: Timestamp::from_millis(10),
        });
        assert_eq!(agent.status, AgentStatus::Healthy);
        assert_eq!(agent.version, "1.4.2");
        assert_eq!(agent.sync_count, 1);
        assert_eq!(agent.last_seen_at, Some(Timestamp::from_millis(10)));
        assert_eq!(agent.updated_at, Timestamp::from_millis(10));
    }

    #[test]
    fn late_sync_still_moves_updated_at_forward() {
        let mut agent = Agent::new("a1", "edge-1", "linux", Timestamp::from_millis(50));
        let report = |millis| SyncReport {
            status: AgentStatus::Healthy,
            version: String::new(),
            report: serde_json::Value::Null,
            at: Timestamp::from_millis(millis),
        };

        agent.record_sync(report(50));
        assert!(agent.updated_at > Timestamp::from_millis(50));

        let before = agent.updated_at;
        agent.record_sync(report(10));
        assert!(agent.updated_at > before);
        assert_eq!(agent.last_seen_at, Some(Timestamp::from_millis(10)));
    }

    #[test]
    fn empty_version_keeps_previous() {
        let mut agent = Agent::new("a1", "edge-1", "linux", Timestamp::from_millis(1));
        agent.version = "1.0.0".into();
        agent.record_sync(SyncReport {
            status: AgentStatus::Degraded,
            version: String::new(),
            report: serde_json::Value::Null,
            at: Timestamp::from_millis(2),
        });
        assert_eq!(agent.version, "1.0.0");
    }

    #[test]
    fn labels() {
        let mut agent = Agent::new("a1", "edge-1", "linux", Timestamp::from_millis(1)).with_label("env", "prod");
        assert_eq!(agent.label("env"), Some("prod"));
        assert_eq!(agent.remove_label("missing", Timestamp::from_millis(9)), None);
        assert_eq!(agent.updated_at, Timestamp::from_millis(1));
        assert_eq!(agent.remove_label("env", Timestamp::from_millis(9)).as_deref(), Some("prod"));
        assert_eq!(agent.updated_at, Timestamp::from_millis(9));
    }
}
