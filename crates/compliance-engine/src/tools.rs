//! Tool definitions and dispatch for chat-driven compliance analysis
//!
//! Results keep the shape the chat layer already consumes: a bare array of
//! flags on success, `{ "error": "..." }` on failure.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::RiskFlag;
use tracing::warn;

use crate::{AnalysisRequest, ComplianceEngine};

pub const ANALYZE_TOOL: &str = "analyze_document_for_compliance_risks";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResult {
    Flags(Vec<RiskFlag>),
    Error { error: String },
}

impl ToolResult {
    pub fn error(message: impl Into<String>) -> Self {
        ToolResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error { .. })
    }
}

/// Get all tool definitions
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: ANALYZE_TOOL.to_string(),
        description: "Analyzes document content against a predefined set of compliance rules to identify potential risks.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "documentContent": {
                    "type": "string",
                    "description": "The full text content of the document to analyze."
                },
                "ruleIds": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional array of rule IDs to check against. If empty, all active rules are used."
                },
                "documentId": {
                    "type": "string",
                    "description": "Optional id of the document being analyzed."
                }
            },
            "required": ["documentContent"]
        }),
    }]
}

/// Handle a tool call. Failures come back as [`ToolResult::Error`], never as a panic.
pub fn execute_tool(engine: &ComplianceEngine, name: &str, args: serde_json::Value) -> ToolResult {
    match name {
        ANALYZE_TOOL => handle_analyze(engine, args),
        other => ToolResult::error(format!("Unknown tool: {}", other)),
    }
}

fn handle_analyze(engine: &ComplianceEngine, args: serde_json::Value) -> ToolResult {
    let request = match AnalysisRequest::from_tool_args(args) {
        Ok(request) => request,
        Err(e) => return ToolResult::error(e.to_string()),
    };
    if request.document_content.is_empty() {
        return ToolResult::error("documentContent is required.");
    }

    match engine.analyze(&request) {
        Ok(report) => ToolResult::Flags(report.flags),
        Err(e) => {
            warn!("compliance tool failed: {}", e);
            ToolResult::error(e.to_string())
        }
    }
}
