//! msh-cf library - Content Filter module
//!
//! Keyword/heuristic content-safety filtering for the Music Study Hub
//! player, with compliance logging of every decision.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use msh_common::config::TomlConfig;
use msh_common::events::ComplianceBus;

pub mod api;
pub mod classifier;
pub mod compliance;
pub mod fallback;
pub mod model;
pub mod pipeline;
pub mod rules;

use classifier::Classifier;
use compliance::{BroadcastSink, ComplianceLogger, JsonLinesSink, TracingSink};
use pipeline::FilterPipeline;
use rules::KeywordRuleSet;

/// Service name reported by health checks and SSE diagnostics
pub const MODULE_NAME: &str = "msh-cf";

/// Compliance block returned with every batch response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInfo {
    pub cipa_compliant: bool,
    pub filtering_active: bool,
    pub educational_context: bool,
    pub user_consent_required: bool,
    pub institution: String,
    pub compliance_standards: Vec<String>,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FilterPipeline>,
    /// Live compliance event feed
    pub bus: Arc<ComplianceBus>,
    pub compliance_info: Arc<ComplianceInfo>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        pipeline: FilterPipeline,
        bus: Arc<ComplianceBus>,
        compliance_info: ComplianceInfo,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            bus,
            compliance_info: Arc::new(compliance_info),
        }
    }

    /// Wire rules, classifier, compliance sinks and pipeline from bootstrap config
    pub fn from_config(config: &TomlConfig) -> msh_common::Result<Self> {
        let rules = Arc::new(KeywordRuleSet::from_config(&config.rules));
        info!(
            "Keyword rules loaded: {} educational, {} blocked",
            rules.educational().len(),
            rules.blocked().len()
        );

        let classifier = Classifier::new(
            rules,
            config.policy.allow_explicit_with_educational_context,
        );

        let bus = Arc::new(ComplianceBus::new(config.compliance.event_capacity));

        let logger = if config.policy.log_content_access {
            let mut logger = ComplianceLogger::new(config.compliance.educational_context.clone())
                .with_sink(Arc::new(BroadcastSink::new(bus.clone())));
            if config.compliance.log_to_tracing {
                logger = logger.with_sink(Arc::new(TracingSink));
            }
            if let Some(path) = &config.compliance.log_file {
                logger = logger.with_sink(Arc::new(JsonLinesSink::open(path)?));
                info!("Compliance entries appended to {}", path.display());
            }
            info!("Compliance logging enabled ({})", logger.sink_names().join(", "));
            logger
        } else {
            info!("Compliance logging disabled by policy");
            ComplianceLogger::disabled()
        };

        let pipeline = FilterPipeline::new(
            classifier,
            logger,
            config.compliance.context_note.clone(),
            config.policy.recommendation_limit,
        );

        let compliance_info = ComplianceInfo {
            cipa_compliant: true,
            filtering_active: true,
            educational_context: true,
            user_consent_required: config.policy.require_user_consent,
            institution: config.compliance.institution.clone(),
            compliance_standards: config.compliance.standards.clone(),
        };

        Ok(Self::new(pipeline, bus, compliance_info))
    }
}

/// Build application router
///
/// Every route is public; access control belongs to the front-end's
/// OAuth session, not to this service.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/content-filter", post(api::filter_content))
        .route("/api/playlists/discover", post(api::discover_playlists))
        .route("/api/playlists/fallback", get(api::fallback_playlists))
        .route("/api/live-gate", post(api::live_gate))
        .route("/api/compliance/events", get(api::compliance_events))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .fallback(api::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(api::error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
