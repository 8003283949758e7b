//! Tamper-evident audit log for rule and compliance events

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Types of auditable events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    View,
    Login,
    Logout,
    AiDraft,
    ComplianceCheck,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Document,
    Case,
    User,
    Rule,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("chain broken at entry {index}: expected previous hash {expected:?}, found {found:?}")]
    BrokenChain {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("audit log serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: i64,
    pub user_id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub details: serde_json::Value,
    pub previous_hash: Option<String>,
}

impl AuditLogEntry {
    pub fn new(
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        user_id: &str,
        details: serde_json::Value,
        previous_hash: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            user_id: user_id.to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            details,
            previous_hash,
        }
    }

    /// Compute the hash of this entry (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.user_id.as_bytes());
        hasher.update(format!("{:?}", self.action).as_bytes());
        hasher.update(format!("{:?}", self.entity_type).as_bytes());
        hasher.update(self.entity_id.as_bytes());
        hasher.update(self.details.to_string().as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Append-only log with hash linking between consecutive entries
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub entries: Vec<AuditLogEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the hash of the last entry (for linking)
    pub fn last_hash(&self) -> Option<String> {
        self.entries.last().map(|e| e.compute_hash())
    }

    /// Append an entry, automatically linking to previous hash
    pub fn append(
        &mut self,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        user_id: &str,
        details: serde_json::Value,
    ) -> &AuditLogEntry {
        let previous_hash = self.last_hash();
        let entry = AuditLogEntry::new(
            action,
            entity_type,
            entity_id,
            user_id,
            details,
            previous_hash,
        );
        let index = self.entries.len();
        self.entries.push(entry);
        &self.entries[index]
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected_prev: Option<String> = None;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.previous_hash != expected_prev {
                return Err(AuditError::BrokenChain {
                    index,
                    expected: expected_prev,
                    found: entry.previous_hash.clone(),
                });
            }
            expected_prev = Some(entry.compute_hash());
        }

        Ok(())
    }

    /// Entries sorted by descending timestamp; ties keep the later append first.
    pub fn newest_first(&self) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self.entries.iter().rev().cloned().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        Ok(serde_json::from_str(json)?)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn action_strategy() -> impl Strategy<Value = AuditAction> {
        prop_oneof![
            Just(AuditAction::Create),
            Just(AuditAction::Update),
            Just(AuditAction::Delete),
            Just(AuditAction::View),
            Just(AuditAction::ComplianceCheck),
        ]
    }

    proptest! {
        /// Property: Any sequence of appends maintains chain integrity
        #[test]
        fn append_preserves_integrity(actions in prop::collection::vec(action_strategy(), 1..20)) {
            let mut log = AuditLog::new();

            for (i, action) in actions.iter().enumerate() {
                log.append(*action, EntityType::Rule, &format!("rule-{}", i), "tester", json!({ "i": i }));
            }

            prop_assert!(log.verify().is_ok());
            prop_assert_eq!(log.len(), actions.len());
        }

        /// Property: Tampering with any entry that has a successor breaks verification
        #[test]
        fn tampering_detected(tamper_index in 0usize..5) {
            let mut log = AuditLog::new();
            for i in 0..6 {
                log.append(AuditAction::View, EntityType::Document, &format!("doc-{}", i), "tester", json!({}));
            }
            prop_assert!(log.verify().is_ok());

            let original = log.entries[tamper_index].entity_id.clone();
            log.entries[tamper_index].entity_id = "tampered".to_string();
            prop_assert!(log.verify().is_err());

            log.entries[tamper_index].entity_id = original;
            prop_assert!(log.verify().is_ok());
        }

        /// Property: A restored log still verifies
        #[test]
        fn json_restore_verifies(count in 1usize..10) {
            let mut log = AuditLog::new();
            for i in 0..count {
                log.append(AuditAction::Update, EntityType::Rule, "rule-1", "tester", json!({ "rev": i }));
            }

            let restored = AuditLog::from_json(&log.to_json().unwrap()).unwrap();
            prop_assert_eq!(restored.len(), count);
            prop_assert!(restored.verify().is_ok());
        }
    }
}
