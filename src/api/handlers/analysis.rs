//! Handler for running a campaign analysis.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::api::models::analysis::AnalysisResponse;
use crate::auth::CurrentUser;
use crate::errors::Result;
use crate::types::OfferId;
use crate::AppState;

/// Run an AI analysis for an offer.
///
/// Looks up the offer, checks ownership and the metrics precondition, consumes
/// one rate-limit slot, calls the model and persists the validated report.
#[utoipa::path(
    post,
    path = "/offers/{offer_id}/analyze",
    params(
        ("offer_id" = uuid::Uuid, Path, description = "Offer to analyze")
    ),
    responses(
        (status = 200, description = "Analysis completed and persisted", body = AnalysisResponse),
        (status = 400, description = "Offer has no metrics snapshot yet"),
        (status = 401, description = "Missing or invalid user header"),
        (status = 403, description = "Offer belongs to another user"),
        (status = 404, description = "Offer not found"),
        (status = 429, description = "Per-user analysis limit reached"),
        (status = 502, description = "Model returned invalid output"),
        (status = 504, description = "Model unavailable or timed out"),
    ),
    tag = "analysis"
)]
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn analyze_offer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(offer_id): Path<OfferId>,
) -> Result<Json<AnalysisResponse>> {
    let report = state.service.analyze_offer(user.id, offer_id).await?;
    Ok(Json(AnalysisResponse::try_from(report)?))
}
