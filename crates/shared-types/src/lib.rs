pub mod audit;
pub mod types;

pub use audit::{AuditAction, AuditError, AuditLog, AuditLogEntry, EntityType};
pub use types::{
    ComplianceReport, ComplianceRule, FlagSummary, RiskFlag, RiskFlagStatus, RuleDraft, Severity,
};
