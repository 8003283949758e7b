//! LexiGuard Server
//!
//! REST front end for the compliance engine. Provides endpoints for:
//!
//! - Compliance rule management (create, update, delete, reload)
//! - Document risk analysis against the active rule set
//! - Tool dispatch for the chat layer
//! - Risk flag review and the audit trail
//!
//! ## Configuration
//!
//! Settings come from command-line flags, falling back to `LEXIGUARD_*`
//! environment variables. A `.env` file in the working directory is loaded
//! first when present.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;

use api::{
    handle_analyze, handle_create_rule, handle_delete_rule, handle_execute_tool,
    handle_flag_summary, handle_get_rule, handle_health, handle_list_audit, handle_list_flags,
    handle_list_rules, handle_list_tools, handle_reload_rules, handle_update_flag_status,
    handle_update_rule,
};
use state::AppState;

/// Command-line arguments for the LexiGuard server
#[derive(Parser, Debug)]
#[command(name = "lexiguard-server")]
#[command(about = "LexiGuard compliance rule and risk flagging server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "LEXIGUARD_PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "LEXIGUARD_HOST", default_value = "0.0.0.0")]
    host: String,

    /// JSON rules document; rules live in memory when omitted
    #[arg(long, env = "LEXIGUARD_RULES_FILE")]
    rules_file: Option<PathBuf>,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Requests a single IP may send in one burst
fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

/// Build the application router without rate limiting
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Rules
        .route("/api/rules", get(handle_list_rules).post(handle_create_rule))
        .route("/api/rules/reload", post(handle_reload_rules))
        .route(
            "/api/rules/:id",
            get(handle_get_rule)
                .put(handle_update_rule)
                .delete(handle_delete_rule),
        )
        // Analysis
        .route("/api/compliance/analyze", post(handle_analyze))
        .route("/api/tools", get(handle_list_tools))
        .route("/api/tools/:name", post(handle_execute_tool))
        // Review
        .route("/api/flags", get(handle_list_flags))
        .route("/api/flags/summary", get(handle_flag_summary))
        .route("/api/flags/:id/status", put(handle_update_flag_status))
        .route("/api/audit", get(handle_list_audit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LexiGuard server on {}:{}", args.host, args.port);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(burst_size(args.rate_limit))
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit: {}", args.rate_limit))?,
    );

    let state = AppState::from_rules_file(args.rules_file);

    let app = app(state).layer(GovernorLayer {
        config: governor_conf,
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
