//! Rules persisted as a single JSON document
//!
//! Parsed rules are cached. The cache stays authoritative until
//! [`RuleStore::invalidate`] is called or the store writes the document
//! itself, so edits made to the document behind the store's back are not
//! seen before an invalidate.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use shared_types::{ComplianceRule, RuleDraft};
use tracing::{debug, info};

use super::{new_rule_id, parse_rules, remove_rule, replace_rule, RuleStore};
use crate::error::RuleStoreError;

/// Raw storage for the encoded rule document
pub trait RulesDocument: Send + Sync {
    /// `None` when no document has been written yet
    fn load(&self) -> Result<Option<String>, RuleStoreError>;

    fn save(&self, content: &str) -> Result<(), RuleStoreError>;
}

/// Rule document kept in a file on disk
#[derive(Debug, Clone)]
pub struct FileRulesDocument {
    path: PathBuf,
}

impl FileRulesDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RulesDocument for FileRulesDocument {
    fn load(&self) -> Result<Option<String>, RuleStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, content: &str) -> Result<(), RuleStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so readers never see a half-written document
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Rule document held in memory
#[derive(Debug, Default)]
pub struct MemoryRulesDocument {
    content: RwLock<Option<String>>,
}

impl MemoryRulesDocument {
    pub fn new(content: Option<String>) -> Self {
        Self {
            content: RwLock::new(content),
        }
    }

    /// Overwrite the document without going through a store
    pub fn replace(&self, content: &str) {
        *self.content.write().unwrap_or_else(|e| e.into_inner()) = Some(content.to_string());
    }
}

impl RulesDocument for MemoryRulesDocument {
    fn load(&self) -> Result<Option<String>, RuleStoreError> {
        Ok(self.content.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, content: &str) -> Result<(), RuleStoreError> {
        self.replace(content);
        Ok(())
    }
}

pub struct DocumentRuleStore<D> {
    document: D,
    cache: RwLock<Option<Vec<ComplianceRule>>>,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl<D: RulesDocument> DocumentRuleStore<D> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    fn cached(&self) -> Option<Vec<ComplianceRule>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn load_rules(&self) -> Result<Vec<ComplianceRule>, RuleStoreError> {
        if let Some(rules) = self.cached() {
            return Ok(rules);
        }
        // A miss fills the cache under the writer lock so it can't overwrite
        // rules a concurrent write has just stored
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load_locked()
    }

    /// Caller must hold `write_lock`
    fn load_locked(&self) -> Result<Vec<ComplianceRule>, RuleStoreError> {
        if let Some(rules) = self.cached() {
            return Ok(rules);
        }

        let rules = match self.document.load()? {
            Some(content) => parse_rules(&content)?,
            None => {
                debug!("no rules document found, starting with an empty rule set");
                Vec::new()
            }
        };
        info!("loaded {} compliance rules", rules.len());

        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(rules.clone());
        Ok(rules)
    }

    fn write_rules(&self, rules: Vec<ComplianceRule>) -> Result<(), RuleStoreError> {
        let content = serde_json::to_string_pretty(&rules)?;
        self.document.save(&content)?;
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(rules);
        Ok(())
    }

    fn modify<T>(
        &self,
        change: impl FnOnce(&mut Vec<ComplianceRule>) -> Result<T, RuleStoreError>,
    ) -> Result<T, RuleStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut rules = self.load_locked()?;
        let result = change(&mut rules)?;
        self.write_rules(rules)?;
        Ok(result)
    }
}

impl<D: RulesDocument> RuleStore for DocumentRuleStore<D> {
    fn list(&self) -> Result<Vec<ComplianceRule>, RuleStoreError> {
        self.load_rules()
    }

    fn add(&self, draft: RuleDraft) -> Result<ComplianceRule, RuleStoreError> {
        let rule = draft.into_rule(new_rule_id());
        self.modify(|rules| {
            rules.push(rule.clone());
            Ok(rule)
        })
    }

    fn update(&self, rule: ComplianceRule) -> Result<ComplianceRule, RuleStoreError> {
        self.modify(|rules| replace_rule(rules, rule))
    }

    fn delete(&self, id: &str) -> Result<(), RuleStoreError> {
        self.modify(|rules| remove_rule(rules, id))
    }

    fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl<D> std::fmt::Debug for DocumentRuleStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRuleStore").finish_non_exhaustive()
    }
}
