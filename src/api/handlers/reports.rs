//! Handlers for reading stored analysis reports.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::api::models::reports::{ReportListResponse, ReportResponse};
use crate::auth::CurrentUser;
use crate::errors::Result;
use crate::types::{OfferId, ReportId};
use crate::AppState;

/// List an offer's report history, newest first.
#[utoipa::path(
    get,
    path = "/offers/{offer_id}/reports",
    params(
        ("offer_id" = uuid::Uuid, Path, description = "Offer whose reports to list")
    ),
    responses(
        (status = 200, description = "Report history for the offer", body = ReportListResponse),
        (status = 401, description = "Missing or invalid user header"),
        (status = 403, description = "Offer belongs to another user"),
        (status = 404, description = "Offer not found"),
    ),
    tag = "reports"
)]
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn list_reports(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(offer_id): Path<OfferId>,
) -> Result<Json<ReportListResponse>> {
    let reports = state.service.list_reports(user.id, offer_id).await?;
    Ok(Json(ReportListResponse::from(reports)))
}

/// Fetch a single stored report.
#[utoipa::path(
    get,
    path = "/reports/{report_id}",
    params(
        ("report_id" = uuid::Uuid, Path, description = "Report to fetch")
    ),
    responses(
        (status = 200, description = "The stored report with its owning offer", body = ReportResponse),
        (status = 401, description = "Missing or invalid user header"),
        (status = 403, description = "Report belongs to another user"),
        (status = 404, description = "Report not found"),
    ),
    tag = "reports"
)]
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn get_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(report_id): Path<ReportId>,
) -> Result<Json<ReportResponse>> {
    let detail = state.service.get_report(user.id, report_id).await?;
    Ok(Json(ReportResponse::from(detail)))
}
