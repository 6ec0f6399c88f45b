pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod persistence;
pub mod routes;
pub mod scan;
pub mod state;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::llm::openai::OpenAiClient;
use crate::ocr::document_ai::DocumentAiClient;
use crate::persistence::{CardStore, PgCardStore, UnconfiguredCardStore};
use crate::state::{AppState, SharedState};
use crate::storage::SubmissionStore;

/// Wire the production collaborators. Without a pool, persistence calls fail but scanning works.
pub fn build_state(config: Config, pool: Option<PgPool>) -> Result<SharedState, String> {
    let ocr = DocumentAiClient::new(&config.document_ai)?;
    let llm = OpenAiClient::new(&config.openai)?;

    let cards: Arc<dyn CardStore> = match pool {
        Some(pool) => Arc::new(PgCardStore::new(pool)),
        None => {
            tracing::warn!("DATABASE_URL not set; scan results will not be saved");
            Arc::new(UnconfiguredCardStore)
        }
    };

    Ok(Arc::new(AppState {
        store: SubmissionStore::new(config.upload_dir.clone()),
        config,
        ocr: Arc::new(ocr),
        llm: Arc::new(llm),
        cards,
    }))
}

pub fn build_app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::scan_routes(state.config.max_body_size))
        .nest_service("/static", ServeDir::new("public"))
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
