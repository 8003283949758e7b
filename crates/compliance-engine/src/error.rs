use thiserror::Error;

/// Failures reading or writing the rule set
#[derive(Debug, Error)]
pub enum RuleStoreError {
    #[error("Rule not found: {0}")]
    NotFound(String),

    #[error("Malformed rule set: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Rule document I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rules(#[from] RuleStoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
