/// Ordinal risk level attached to a rule and copied onto its flags.
///
/// Variants are declared in ascending order so `Ord` gives
/// `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named keyword set scanned for in document text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>, // Matched case-insensitively, in list order
    pub severity: Severity,
    pub is_active: bool,
}

/// A rule as submitted for creation, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub keywords: Vec<String>,
    pub severity: Severity,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RuleDraft {
    pub fn into_rule(self, id: String) -> ComplianceRule {
        ComplianceRule {
            id,
            name: self.name,
            description: self.description,
            keywords: self.keywords,
            severity: self.severity,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlagStatus {
    Pending,
    Addressed,
    Ignored,
}

/// Evidence that a document matched a rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    pub id: String,
    pub document_id: String,
    pub rule_id: String,
    pub flagged_content: String, // "...<snippet>..."
    pub severity: Severity,
    pub status: RiskFlagStatus,
    pub timestamp: i64, // Epoch milliseconds
}

impl RiskFlag {
    /// Copy of this flag with a new review status; every other field is kept.
    pub fn with_status(&self, status: RiskFlagStatus) -> RiskFlag {
        RiskFlag {
            status,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub document_id: String,
    pub flags: Vec<RiskFlag>,
    pub checked_at: i64,
}

/// Flag counts for a dashboard summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlagSummary {
    pub total: usize,
    pub pending: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl FlagSummary {
    pub fn from_flags<'a>(flags: impl IntoIterator<Item = &'a RiskFlag>) -> Self {
        let mut summary = FlagSummary::default();
        for flag in flags {
            summary.total += 1;
            if flag.status == RiskFlagStatus::Pending {
                summary.pending += 1;
            }
            match flag.severity {
                Severity::Low => summary.low += 1,
                Severity::Medium => summary.medium += 1,
                Severity::High => summary.high += 1,
                Severity::Critical => summary.critical += 1,
            }
        }
        summary
    }
}
