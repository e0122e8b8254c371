//! HTTP API surface.

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub mod handlers;
pub mod models;

/// All API routes, nested under the application root by [`crate::build_router`]
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers/{offer_id}/analyze", post(handlers::analysis::analyze_offer))
        .route("/offers/{offer_id}/reports", get(handlers::reports::list_reports))
        .route("/reports/{report_id}", get(handlers::reports::get_report))
}
