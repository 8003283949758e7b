//! Shared application state for the LexiGuard server

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use compliance_engine::rules::{DocumentRuleStore, FileRulesDocument, MemoryRuleStore};
use compliance_engine::{ComplianceEngine, MemoryFlagSink, RuleStore};
use shared_types::{AuditAction, AuditLog, AuditLogEntry, EntityType};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ComplianceEngine>,
    pub flags: Arc<MemoryFlagSink>,
    pub audit: Arc<RwLock<AuditLog>>,
}

impl AppState {
    pub fn new(engine: ComplianceEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            flags: Arc::new(MemoryFlagSink::new()),
            audit: Arc::new(RwLock::new(AuditLog::new())),
        }
    }

    /// File-backed rules when a path is configured, in-memory rules otherwise
    pub fn from_rules_file(rules_file: Option<PathBuf>) -> Self {
        let store: Arc<dyn RuleStore> = match rules_file {
            Some(path) => {
                info!("Using rules document at {}", path.display());
                Arc::new(DocumentRuleStore::new(FileRulesDocument::new(path)))
            }
            None => {
                info!("No rules file configured, rules are kept in memory");
                Arc::new(MemoryRuleStore::new())
            }
        };
        Self::new(ComplianceEngine::new(store))
    }

    pub fn rules(&self) -> &dyn RuleStore {
        self.engine.rules()
    }

    pub fn record(
        &self,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        user_id: &str,
        details: serde_json::Value,
    ) {
        let mut audit = self.audit.write().unwrap_or_else(|e| e.into_inner());
        audit.append(action, entity_type, entity_id, user_id, details);
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .newest_first()
    }
}
