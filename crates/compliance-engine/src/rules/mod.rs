//! Compliance rule storage and selection
//!
//! The flagger never fetches rules itself; a [`RuleStore`] hands it an
//! already-decoded list and [`select_rules`] narrows that list per request.

mod document;
mod memory;

pub use document::{DocumentRuleStore, FileRulesDocument, MemoryRulesDocument, RulesDocument};
pub use memory::MemoryRuleStore;

use shared_types::{ComplianceRule, RuleDraft};
use uuid::Uuid;

use crate::error::RuleStoreError;

pub trait RuleStore: Send + Sync {
    /// All rules, active or not, in stored order
    fn list(&self) -> Result<Vec<ComplianceRule>, RuleStoreError>;

    fn get(&self, id: &str) -> Result<ComplianceRule, RuleStoreError> {
        self.list()?
            .into_iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| RuleStoreError::NotFound(id.to_string()))
    }

    /// Store a new rule under a freshly generated id
    fn add(&self, draft: RuleDraft) -> Result<ComplianceRule, RuleStoreError>;

    /// Replace the rule with the same id
    fn update(&self, rule: ComplianceRule) -> Result<ComplianceRule, RuleStoreError>;

    fn delete(&self, id: &str) -> Result<(), RuleStoreError>;

    /// Drop any cached copy so the next read goes to the backing storage
    fn invalidate(&self) {}
}

pub fn new_rule_id() -> String {
    format!("rule-{}", Uuid::new_v4())
}

/// Decode a stored rule document. Blank content is an empty rule set.
pub fn parse_rules(json: &str) -> Result<Vec<ComplianceRule>, RuleStoreError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

/// Keep active rules, restricted to `rule_ids` when that list is non-empty.
pub fn select_rules(rules: Vec<ComplianceRule>, rule_ids: &[String]) -> Vec<ComplianceRule> {
    rules
        .into_iter()
        .filter(|rule| rule.is_active)
        .filter(|rule| rule_ids.is_empty() || rule_ids.iter().any(|id| *id == rule.id))
        .collect()
}

fn replace_rule(
    rules: &mut [ComplianceRule],
    rule: ComplianceRule,
) -> Result<ComplianceRule, RuleStoreError> {
    let slot = rules
        .iter_mut()
        .find(|existing| existing.id == rule.id)
        .ok_or_else(|| RuleStoreError::NotFound(rule.id.clone()))?;
    *slot = rule.clone();
    Ok(rule)
}

fn remove_rule(rules: &mut Vec<ComplianceRule>, id: &str) -> Result<(), RuleStoreError> {
    let before = rules.len();
    rules.retain(|rule| rule.id != id);
    if rules.len() == before {
        return Err(RuleStoreError::NotFound(id.to_string()));
    }
    Ok(())
}
