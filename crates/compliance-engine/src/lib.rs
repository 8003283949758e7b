pub mod error;
pub mod flagger;
pub mod patterns;
pub mod providers;
pub mod rules;
pub mod sink;
pub mod tools;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{ComplianceReport, RiskFlag};
use tracing::info;

pub use error::{EngineError, RuleStoreError};
pub use flagger::{RiskFlagger, UNKNOWN_DOCUMENT};
pub use rules::{select_rules, RuleStore};
pub use sink::{FlagSink, MemoryFlagSink};
pub use tools::{execute_tool, tool_definitions, ToolResult, ANALYZE_TOOL};

/// What to analyze and against which rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub document_content: String,
    /// Restrict analysis to these rule ids; empty means every active rule
    #[serde(default)]
    pub rule_ids: Option<Vec<String>>,
    #[serde(default)]
    pub document_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(document_content: impl Into<String>) -> Self {
        Self {
            document_content: document_content.into(),
            ..Self::default()
        }
    }

    /// Decode untyped tool-call arguments
    pub fn from_tool_args(args: serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(args)
            .map_err(|e| EngineError::InvalidRequest(format!("invalid tool arguments: {}", e)))
    }

    fn rule_ids(&self) -> &[String] {
        self.rule_ids.as_deref().unwrap_or(&[])
    }
}

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    rules: Arc<dyn RuleStore>,
    flagger: RiskFlagger,
}

impl ComplianceEngine {
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self::with_flagger(rules, RiskFlagger::new())
    }

    pub fn with_flagger(rules: Arc<dyn RuleStore>, flagger: RiskFlagger) -> Self {
        Self { rules, flagger }
    }

    pub fn rules(&self) -> &dyn RuleStore {
        self.rules.as_ref()
    }

    /// Run the selected active rules over the request's document text
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<ComplianceReport, EngineError> {
        let rules = select_rules(self.rules.list()?, request.rule_ids());
        let flags = self.flagger.flag(
            &request.document_content,
            &rules,
            request.document_id.as_deref(),
        );

        info!(
            "Compliance analysis: {} rules checked, {} flags raised",
            rules.len(),
            flags.len()
        );

        Ok(ComplianceReport {
            document_id: request
                .document_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_DOCUMENT.to_string()),
            flags,
            checked_at: self.flagger.clock().now_millis(),
        })
    }

    /// Check raw text against every active rule
    pub fn check_text(&self, text: &str) -> Result<Vec<RiskFlag>, EngineError> {
        Ok(self.analyze(&AnalysisRequest::new(text))?.flags)
    }
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("flagger", &self.flagger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FixedClock, SequentialIds};
    use crate::rules::MemoryRuleStore;
    use pretty_assertions::assert_eq;
    use shared_types::{ComplianceRule, RiskFlagStatus, Severity};

    fn rule(id: &str, keywords: &[&str], severity: Severity, is_active: bool) -> ComplianceRule {
        ComplianceRule {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            severity,
            is_active,
        }
    }

    fn engine(rules: Vec<ComplianceRule>) -> ComplianceEngine {
        let flagger = RiskFlagger::with_providers(
            Arc::new(SequentialIds::new("flag")),
            Arc::new(FixedClock(1_000)),
        );
        ComplianceEngine::with_flagger(Arc::new(MemoryRuleStore::with_rules(rules)), flagger)
    }

    #[test]
    fn test_engine_flags_matching_rules() {
        let engine = engine(vec![
            rule("rule-fraud", &["fraud"], Severity::Critical, true),
            rule("rule-aml", &["suspicious", "offshore"], Severity::High, true),
        ]);
        let request = AnalysisRequest {
            document_content: "This involves a suspicious wire transfer to an offshore account."
                .to_string(),
            rule_ids: None,
            document_id: Some("doc-42".to_string()),
        };

        let report = engine.analyze(&request).unwrap();

        assert_eq!(report.document_id, "doc-42");
        assert_eq!(report.checked_at, 1_000);
        assert_eq!(report.flags.len(), 1);
        assert_eq!(report.flags[0].rule_id, "rule-aml");
        assert_eq!(report.flags[0].severity, Severity::High);
        assert_eq!(report.flags[0].status, RiskFlagStatus::Pending);
        assert!(report.flags[0].flagged_content.contains("suspicious"));
    }

    #[test]
    fn test_engine_skips_inactive_rules() {
        let engine = engine(vec![rule("rule-old", &["escrow"], Severity::Low, false)]);
        assert!(engine.check_text("Funds held in escrow").unwrap().is_empty());
    }

    #[test]
    fn test_engine_filters_by_rule_ids() {
        let engine = engine(vec![
            rule("rule-a", &["alpha"], Severity::Low, true),
            rule("rule-b", &["beta"], Severity::Low, true),
        ]);
        let request = AnalysisRequest {
            document_content: "alpha beta".to_string(),
            rule_ids: Some(vec!["rule-b".to_string()]),
            document_id: None,
        };

        let report = engine.analyze(&request).unwrap();

        assert_eq!(report.document_id, UNKNOWN_DOCUMENT);
        assert_eq!(report.flags.len(), 1);
        assert_eq!(report.flags[0].rule_id, "rule-b");
    }

    #[test]
    fn test_empty_rule_ids_means_all_active_rules() {
        let engine = engine(vec![
            rule("rule-a", &["alpha"], Severity::Low, true),
            rule("rule-b", &["beta"], Severity::Low, true),
        ]);
        let request = AnalysisRequest {
            document_content: "alpha beta".to_string(),
            rule_ids: Some(vec![]),
            document_id: None,
        };

        assert_eq!(engine.analyze(&request).unwrap().flags.len(), 2);
    }

    #[test]
    fn test_blank_document_gives_empty_report() {
        let engine = engine(vec![rule("rule-a", &["alpha"], Severity::Low, true)]);
        assert!(engine.analyze(&AnalysisRequest::new("")).unwrap().flags.is_empty());
    }

    #[test]
    fn test_request_decodes_camel_case() {
        let request = AnalysisRequest::from_tool_args(serde_json::json!({
            "documentContent": "text",
            "ruleIds": ["r1"],
            "documentId": "d1"
        }))
        .unwrap();

        assert_eq!(request.rule_ids().to_vec(), vec!["r1".to_string()]);
        assert_eq!(request.document_id.as_deref(), Some("d1"));
    }
}
