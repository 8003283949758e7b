use std::sync::RwLock;

use shared_types::{ComplianceRule, RuleDraft};

use super::{new_rule_id, remove_rule, replace_rule, RuleStore};
use crate::error::RuleStoreError;

/// Rules held only in process memory
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<Vec<ComplianceRule>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<ComplianceRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

impl RuleStore for MemoryRuleStore {
    fn list(&self) -> Result<Vec<ComplianceRule>, RuleStoreError> {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        Ok(rules.clone())
    }

    fn add(&self, draft: RuleDraft) -> Result<ComplianceRule, RuleStoreError> {
        let rule = draft.into_rule(new_rule_id());
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        rules.push(rule.clone());
        Ok(rule)
    }

    fn update(&self, rule: ComplianceRule) -> Result<ComplianceRule, RuleStoreError> {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        replace_rule(&mut rules, rule)
    }

    fn delete(&self, id: &str) -> Result<(), RuleStoreError> {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        remove_rule(&mut rules, id)
    }
}
