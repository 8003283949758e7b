//! Rule-based risk flagging
//!
//! Scans a document for each rule's keywords and emits at most one flag per
//! rule, built from the first keyword (in the rule's list order) that occurs
//! anywhere in the text. Output order follows rule order, not match position.

use std::sync::Arc;

use shared_types::{ComplianceRule, RiskFlag, RiskFlagStatus};
use tracing::debug;

use crate::patterns::{FoldedText, KeywordMatch, SNIPPET_RADIUS};
use crate::providers::{Clock, IdGenerator, SystemClock, UuidFlagIds};

/// Document id used when the caller doesn't supply one
pub const UNKNOWN_DOCUMENT: &str = "unknown";

#[derive(Clone)]
pub struct RiskFlagger {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl RiskFlagger {
    pub fn new() -> Self {
        Self::with_providers(Arc::new(UuidFlagIds), Arc::new(SystemClock))
    }

    pub fn with_providers(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Flag every rule that has at least one keyword present in `document_text`.
    ///
    /// Rules are not filtered on `is_active`; callers pass only the rules they
    /// want evaluated.
    pub fn flag(
        &self,
        document_text: &str,
        rules: &[ComplianceRule],
        document_id: Option<&str>,
    ) -> Vec<RiskFlag> {
        if document_text.is_empty() || rules.is_empty() {
            return Vec::new();
        }

        let haystack = FoldedText::new(document_text);
        let document_id = document_id.unwrap_or(UNKNOWN_DOCUMENT);

        rules
            .iter()
            .filter_map(|rule| {
                let (keyword, found) = first_keyword_match(&haystack, rule)?;
                debug!(
                    rule_id = %rule.id,
                    keyword = %keyword,
                    position = found.start,
                    "rule matched"
                );
                Some(self.build_flag(&haystack, rule, found, document_id))
            })
            .collect()
    }

    fn build_flag(
        &self,
        haystack: &FoldedText<'_>,
        rule: &ComplianceRule,
        found: KeywordMatch,
        document_id: &str,
    ) -> RiskFlag {
        RiskFlag {
            id: self.ids.next_id(),
            document_id: document_id.to_string(),
            rule_id: rule.id.clone(),
            flagged_content: haystack.snippet(found, SNIPPET_RADIUS),
            severity: rule.severity,
            status: RiskFlagStatus::Pending,
            timestamp: self.clock.now_millis(),
        }
    }
}

impl Default for RiskFlagger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RiskFlagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskFlagger").finish_non_exhaustive()
    }
}

/// First keyword in list order that occurs in the text; later keywords are not searched.
fn first_keyword_match<'r>(
    haystack: &FoldedText<'_>,
    rule: &'r ComplianceRule,
) -> Option<(&'r str, KeywordMatch)> {
    rule.keywords
        .iter()
        .find_map(|keyword| haystack.find(keyword).map(|found| (keyword.as_str(), found)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FixedClock, SequentialIds};
    use pretty_assertions::assert_eq;
    use shared_types::Severity;

    const NOW: i64 = 1_717_171_717_000;

    fn flagger() -> RiskFlagger {
        RiskFlagger::with_providers(Arc::new(SequentialIds::new("flag")), Arc::new(FixedClock(NOW)))
    }

    fn rule(id: &str, keywords: &[&str], severity: Severity) -> ComplianceRule {
        ComplianceRule {
            id: id.to_string(),
            name: format!("{} rule", id),
            description: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            severity,
            is_active: true,
        }
    }

    #[test]
    fn test_first_listed_keyword_wins() {
        let text = "This involves a suspicious wire transfer to an offshore account.";
        let rules = vec![rule("aml", &["suspicious", "offshore"], Severity::High)];

        let flags = flagger().flag(text, &rules, Some("doc-7"));

        assert_eq!(
            flags,
            vec![RiskFlag {
                id: "flag-1".to_string(),
                document_id: "doc-7".to_string(),
                rule_id: "aml".to_string(),
                flagged_content: format!("...{}...", text),
                severity: Severity::High,
                status: RiskFlagStatus::Pending,
                timestamp: NOW,
            }]
        );
    }

    #[test]
    fn test_list_order_beats_text_position() {
        // "offshore" occurs later in the text but is listed first
        let text = format!("suspicious{}offshore", " ".repeat(120));
        let rules = vec![rule("aml", &["offshore", "suspicious"], Severity::Medium)];

        let flags = flagger().flag(&text, &rules, None);

        assert_eq!(flags.len(), 1);
        assert!(flags[0].flagged_content.ends_with("offshore..."));
        assert!(!flags[0].flagged_content.contains("suspicious"));
    }

    #[test]
    fn test_no_match_yields_nothing() {
        let rules = vec![rule("fraud", &["fraud"], Severity::Critical)];
        assert!(flagger().flag("no risk words here", &rules, None).is_empty());
    }

    #[test]
    fn test_only_matching_rules_are_flagged() {
        let rules = vec![
            rule("gdpr", &["personal data"], Severity::Low),
            rule("bribery", &["kickback"], Severity::Critical),
        ];

        let flags = flagger().flag("The vendor requested a KICKBACK.", &rules, None);

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].rule_id, "bribery");
        assert_eq!(flags[0].severity, Severity::Critical);
        assert_eq!(flags[0].flagged_content, "...The vendor requested a KICKBACK....");
    }

    #[test]
    fn test_output_follows_rule_order() {
        let text = "alpha beta gamma";
        let rules = vec![
            rule("third-word", &["gamma"], Severity::Low),
            rule("first-word", &["alpha"], Severity::Low),
            rule("second-word", &["beta"], Severity::Low),
        ];

        let ids: Vec<String> = flagger()
            .flag(text, &rules, None)
            .into_iter()
            .map(|f| f.rule_id)
            .collect();

        assert_eq!(ids, vec!["third-word", "first-word", "second-word"]);
    }

    #[test]
    fn test_empty_inputs() {
        let rules = vec![rule("any", &["word"], Severity::Low)];
        assert!(flagger().flag("", &[], None).is_empty());
        assert!(flagger().flag("some text", &[], None).is_empty());
        assert!(flagger().flag("", &rules, None).is_empty());
    }

    #[test]
    fn test_rule_without_keywords_never_matches() {
        let rules = vec![rule("empty", &[], Severity::High)];
        assert!(flagger().flag("any text", &rules, None).is_empty());
    }

    #[test]
    fn test_blank_keyword_flags_document_start() {
        let text = format!("Opening clause{}", "z".repeat(60));
        let rules = vec![
            rule("empty", &[], Severity::High),
            rule("blank", &[""], Severity::Medium),
        ];

        let flags = flagger().flag(&text, &rules, None);

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].rule_id, "blank");
        assert_eq!(
            flags[0].flagged_content,
            format!("...Opening clause{}...", "z".repeat(36))
        );
        assert!(flagger().flag("", &rules, None).is_empty());
    }

    #[test]
    fn test_match_at_index_zero() {
        let text = format!("Sanctions apply here{}", ".".repeat(100));
        let rules = vec![rule("ofac", &["sanctions"], Severity::High)];

        let flags = flagger().flag(&text, &rules, None);

        let expected_inner: String = text.chars().take(9 + SNIPPET_RADIUS).collect();
        assert_eq!(flags[0].flagged_content, format!("...{}...", expected_inner));
    }

    #[test]
    fn test_match_near_end_is_clamped() {
        let text = format!("{}laundering", "x".repeat(100));
        let rules = vec![rule("aml", &["LAUNDERING"], Severity::High)];

        let flags = flagger().flag(&text, &rules, None);

        assert_eq!(
            flags[0].flagged_content,
            format!("...{}laundering...", "x".repeat(50))
        );
    }

    #[test]
    fn test_inactive_rules_are_still_evaluated() {
        let mut inactive = rule("dormant", &["embargo"], Severity::Low);
        inactive.is_active = false;

        let flags = flagger().flag("embargo in effect", &[inactive], None);
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_missing_document_id_uses_sentinel() {
        let rules = vec![rule("r", &["risk"], Severity::Low)];
        let flags = flagger().flag("risk", &rules, None);
        assert_eq!(flags[0].document_id, UNKNOWN_DOCUMENT);
    }

    #[test]
    fn test_each_flag_gets_a_fresh_id() {
        let rules = vec![
            rule("a", &["alpha"], Severity::Low),
            rule("b", &["beta"], Severity::Low),
        ];
        let flags = flagger().flag("alpha beta", &rules, None);
        assert_eq!(flags[0].id, "flag-1");
        assert_eq!(flags[1].id, "flag-2");

        let production = RiskFlagger::new().flag("alpha beta", &rules, None);
        assert_ne!(production[0].id, production[1].id);
    }
}
