//! offerlens: AI-powered performance analysis for marketing campaigns.
//!
//! The service turns stored campaign data (offers, metrics snapshots, market
//! benchmarks) into structured analysis reports generated by an LLM. One HTTP
//! call runs the whole pipeline: authorization, rate limiting, context
//! assembly, model invocation, strict output validation and persistence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ api::handlers│  (HTTP surface, auth extraction)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │   analysis   │  (orchestration, prompt, engine, validation)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │      db      │  (repositories over PostgreSQL)
//! └──────────────┘
//! ```
//!
//! The analysis service depends on store traits and a model trait rather than
//! concrete types, so the full flow is testable without PostgreSQL or a live
//! model endpoint.

pub mod analysis;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod limits;
mod openapi;
pub mod telemetry;
mod types;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::analysis::engine::AnalysisEngine;
use crate::analysis::gemini::GeminiClient;
use crate::analysis::service::AnalysisService;
use crate::db::stores::{PgBenchmarkStore, PgOfferStore, PgReportStore};
use crate::limits::AnalysisRateLimiter;
use crate::openapi::ApiDoc;

pub use config::Config;
pub use types::{OfferId, ReportId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub service: AnalysisService,
}

impl AppState {
    /// Wires the production object graph: Postgres-backed stores, the Gemini
    /// client and the shared rate limiter.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let model = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let engine = AnalysisEngine::new(model, config.gemini.clone());
        let limiter = Arc::new(AnalysisRateLimiter::new(&config.limits));

        let service = AnalysisService::new(
            Arc::new(PgOfferStore::new(db.clone())),
            Arc::new(PgBenchmarkStore::new(db.clone())),
            Arc::new(PgReportStore::new(db.clone())),
            engine,
            limiter,
        );

        Ok(Self { db, config, service })
    }
}

/// Get the offerlens database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(api::routes())
        .with_state(state)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The assembled application, ready to serve
pub struct Application {
    router: Router,
    listener: TcpListener,
}

impl Application {
    /// Connects to the database, runs migrations and binds the listener
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = PgPool::connect(&config.database.url).await?;
        migrator().run(&db).await?;

        let bind_address = config.bind_address();
        let state = AppState::new(db, config)?;
        let router = build_router(state);

        let listener = TcpListener::bind(&bind_address).await?;
        info!("listening on {}", listener.local_addr()?);

        Ok(Self { router, listener })
    }

    /// Serve until the shutdown future resolves, then drain in-flight requests
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router).with_graceful_shutdown(shutdown).await?;
        telemetry::shutdown_telemetry();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = Config {
        gemini: config::GeminiConfig {
            api_key: "test-key".to_string(),
            ..config::GeminiConfig::default()
        },
        ..Config::default()
    };
    // Lazy pool: never connects unless a query actually runs
    let db = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool creation cannot fail with a well-formed URL");
    AppState::new(db, config).expect("test state wiring")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz_responds_ok() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_without_user_header_is_unauthorized() {
        let router = build_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/offers/{}/analyze", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_json_is_served() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/reports/{report_id}"].is_object());
    }
}
