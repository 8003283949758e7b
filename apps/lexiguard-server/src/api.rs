//! API handlers for the LexiGuard server
//!
//! Provides REST endpoints for:
//! - Compliance rule management
//! - Document risk analysis
//! - Tool dispatch for the chat layer
//! - Risk flag review and the audit trail

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use compliance_engine::tools::ToolDefinition;
use compliance_engine::{
    execute_tool, tool_definitions, AnalysisRequest, FlagSink, ToolResult, UNKNOWN_DOCUMENT,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{
    AuditAction, AuditLogEntry, ComplianceReport, ComplianceRule, EntityType, FlagSummary,
    RiskFlag, RiskFlagStatus, RuleDraft,
};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::state::AppState;

/// Header naming the acting user for audit entries
pub const USER_HEADER: &str = "x-user-id";
const DEFAULT_ACTOR: &str = "system";

/// Success envelope shared by every data endpoint
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ServerError>;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "lexiguard-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn actor(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string()
}

fn validate_rule_name(name: &str) -> Result<(), ServerError> {
    if name.trim().is_empty() {
        return Err(ServerError::InvalidRequest("rule name is required".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Handler: GET /api/rules
pub async fn handle_list_rules(State(state): State<AppState>) -> ApiResult<Vec<ComplianceRule>> {
    Ok(ApiResponse::ok(state.rules().list()?))
}

/// Handler: GET /api/rules/:id
pub async fn handle_get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ComplianceRule> {
    Ok(ApiResponse::ok(state.rules().get(&id)?))
}

/// Handler: POST /api/rules
pub async fn handle_create_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<RuleDraft>,
) -> ApiResult<ComplianceRule> {
    validate_rule_name(&draft.name)?;

    let rule = state.rules().add(draft)?;
    info!("Created rule {} ({})", rule.id, rule.name);

    state.record(
        AuditAction::Create,
        EntityType::Rule,
        &rule.id,
        &actor(&headers),
        json!({ "name": rule.name, "severity": rule.severity }),
    );
    Ok(ApiResponse::ok(rule))
}

/// Handler: PUT /api/rules/:id
///
/// The id in the path wins over any id in the body.
pub async fn handle_update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut rule): Json<ComplianceRule>,
) -> ApiResult<ComplianceRule> {
    validate_rule_name(&rule.name)?;
    rule.id = id;

    let rule = state.rules().update(rule)?;
    info!("Updated rule {}", rule.id);

    state.record(
        AuditAction::Update,
        EntityType::Rule,
        &rule.id,
        &actor(&headers),
        json!({ "isActive": rule.is_active, "severity": rule.severity }),
    );
    Ok(ApiResponse::ok(rule))
}

/// Handler: DELETE /api/rules/:id
pub async fn handle_delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<serde_json::Value> {
    state.rules().delete(&id)?;
    info!("Deleted rule {}", id);

    state.record(
        AuditAction::Delete,
        EntityType::Rule,
        &id,
        &actor(&headers),
        json!({}),
    );
    Ok(ApiResponse::ok(json!({ "deleted": true })))
}

/// Reload response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub rule_count: usize,
}

/// Handler: POST /api/rules/reload
pub async fn handle_reload_rules(State(state): State<AppState>) -> ApiResult<ReloadResponse> {
    state.rules().invalidate();
    let rule_count = state.rules().list()?.len();
    info!("Reloaded {} rules", rule_count);
    Ok(ApiResponse::ok(ReloadResponse { rule_count }))
}

// ---------------------------------------------------------------------------
// Analysis and tools
// ---------------------------------------------------------------------------

/// Handler: POST /api/compliance/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<ComplianceReport> {
    debug!(
        "Analyze request: {} chars, document={:?}",
        req.document_content.chars().count(),
        req.document_id
    );

    let report = state.engine.analyze(&req)?;
    state.flags.accept(&report.flags);

    state.record(
        AuditAction::ComplianceCheck,
        EntityType::Document,
        &report.document_id,
        &actor(&headers),
        json!({ "flagsFound": report.flags.len() }),
    );
    Ok(ApiResponse::ok(report))
}

/// Handler: GET /api/tools
pub async fn handle_list_tools() -> ApiResult<Vec<ToolDefinition>> {
    Ok(ApiResponse::ok(tool_definitions()))
}

/// Handler: POST /api/tools/:name
///
/// Tool failures are part of the result, so this always answers 200.
pub async fn handle_execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(args): Json<serde_json::Value>,
) -> Json<ToolResult> {
    info!("Tool call: {}", name);

    let document_id = args
        .get("documentId")
        .and_then(|v| v.as_str())
        .unwrap_or(UNKNOWN_DOCUMENT)
        .to_string();

    let result = execute_tool(&state.engine, &name, args);
    if let ToolResult::Flags(flags) = &result {
        state.flags.accept(flags);
        state.record(
            AuditAction::ComplianceCheck,
            EntityType::Document,
            &document_id,
            &actor(&headers),
            json!({ "flagsFound": flags.len(), "tool": name }),
        );
    }
    Json(result)
}

// ---------------------------------------------------------------------------
// Flags and audit
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagQuery {
    pub document_id: Option<String>,
}

/// Handler: GET /api/flags
pub async fn handle_list_flags(
    State(state): State<AppState>,
    Query(query): Query<FlagQuery>,
) -> ApiResult<Vec<RiskFlag>> {
    Ok(ApiResponse::ok(state.flags.list(query.document_id.as_deref())))
}

/// Handler: GET /api/flags/summary
pub async fn handle_flag_summary(
    State(state): State<AppState>,
    Query(query): Query<FlagQuery>,
) -> ApiResult<FlagSummary> {
    Ok(ApiResponse::ok(
        state.flags.summary(query.document_id.as_deref()),
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: RiskFlagStatus,
}

/// Handler: PUT /api/flags/:id/status
pub async fn handle_update_flag_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<RiskFlag> {
    let flag = state
        .flags
        .set_status(&id, update.status)
        .ok_or_else(|| ServerError::FlagNotFound(id.clone()))?;
    info!("Flag {} marked {:?}", id, update.status);
    Ok(ApiResponse::ok(flag))
}

/// Handler: GET /api/audit
pub async fn handle_list_audit(State(state): State<AppState>) -> ApiResult<Vec<AuditLogEntry>> {
    Ok(ApiResponse::ok(state.audit_entries()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "lexiguard-server");
    }

    #[test]
    fn test_actor_defaults_to_system() {
        let mut headers = HeaderMap::new();
        assert_eq!(actor(&headers), "system");

        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(actor(&headers), "system");

        headers.insert(USER_HEADER, HeaderValue::from_static("alice"));
        assert_eq!(actor(&headers), "alice");
    }

    #[test]
    fn test_rule_validation() {
        assert!(validate_rule_name("AML").is_ok());
        assert!(validate_rule_name(" ").is_err());
    }
}
