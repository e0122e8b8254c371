//! Analysis orchestration: the full request flow from offer lookup to
//! persisted report.
//!
//! The service owns the ordering guarantees of one analysis request:
//! existence, ownership and the metrics precondition are checked before any
//! quota is consumed, the rate-limit slot is taken before the model is called,
//! and a report is persisted only for a fully validated model reply.
//! Collaborators are traits so the flow can be exercised end to end without a
//! database or a live model endpoint.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use super::context::AnalysisInput;
use super::engine::{AnalysisEngine, EngineError};
use crate::db::models::benchmarks::Benchmark;
use crate::db::models::offers::{Offer, OfferMetrics};
use crate::db::models::reports::{Report, ReportCreateDBRequest, ReportSummary};
use crate::errors::{Error, Result};
use crate::limits::AnalysisRateLimiter;
use crate::types::{OfferId, ReportId, UserId};

/// Read access to offers and their metrics snapshots
#[async_trait]
pub trait OfferStore: Send + Sync {
    async fn get_offer(&self, offer_id: OfferId) -> crate::db::errors::Result<Option<Offer>>;

    /// Latest metrics snapshot for the offer, if any has been recorded
    async fn get_latest_metrics(&self, offer_id: OfferId) -> crate::db::errors::Result<Option<OfferMetrics>>;
}

/// Read access to market benchmarks
#[async_trait]
pub trait BenchmarkStore: Send + Sync {
    /// Benchmarks applicable to the offer: exact scope matches plus
    /// niche-level fallbacks, in stable order
    async fn find_for_offer(&self, offer: &Offer) -> crate::db::errors::Result<Vec<Benchmark>>;
}

/// Persistence for generated reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, request: ReportCreateDBRequest) -> crate::db::errors::Result<Report>;
    async fn list_for_offer(&self, offer_id: OfferId) -> crate::db::errors::Result<Vec<ReportSummary>>;
    async fn get(&self, report_id: ReportId) -> crate::db::errors::Result<Option<Report>>;
}

/// A stored report joined with the offer it was generated for
#[derive(Debug, Clone)]
pub struct ReportDetail {
    pub report: Report,
    pub offer: Offer,
}

/// Orchestrates analysis requests and report reads
#[derive(Clone)]
pub struct AnalysisService {
    offers: Arc<dyn OfferStore>,
    benchmarks: Arc<dyn BenchmarkStore>,
    reports: Arc<dyn ReportStore>,
    engine: AnalysisEngine,
    limiter: Arc<AnalysisRateLimiter>,
}

impl AnalysisService {
    pub fn new(
        offers: Arc<dyn OfferStore>,
        benchmarks: Arc<dyn BenchmarkStore>,
        reports: Arc<dyn ReportStore>,
        engine: AnalysisEngine,
        limiter: Arc<AnalysisRateLimiter>,
    ) -> Self {
        Self {
            offers,
            benchmarks,
            reports,
            engine,
            limiter,
        }
    }

    /// Runs one analysis for the offer on behalf of the acting user.
    ///
    /// Gate order matters: failed preconditions must not consume quota, so the
    /// rate-limit slot is taken only after the offer is known to be ownable and
    /// analyzable. Once taken, the slot stays consumed even when the model call
    /// fails - a failed model attempt still did the expensive work.
    #[instrument(skip(self), fields(user_id = %user_id, offer_id = %offer_id))]
    pub async fn analyze_offer(&self, user_id: UserId, offer_id: OfferId) -> Result<Report> {
        let offer = self.resolve_owned_offer(user_id, offer_id).await?;

        let Some(metrics) = self.offers.get_latest_metrics(offer_id).await? else {
            return Err(Error::PreconditionFailed {
                message: "Offer has no metrics yet. Record campaign metrics before requesting an analysis.".to_string(),
            });
        };

        if !self.limiter.can_analyze(user_id) {
            return Err(Error::RateLimited {
                max_requests: self.limiter.max_requests(),
            });
        }

        let benchmarks = self.benchmarks.find_for_offer(&offer).await?;
        info!(benchmark_count = benchmarks.len(), "assembled analysis context");

        let input = AnalysisInput::assemble(&offer, Some(&metrics), &benchmarks).map_err(|e| Error::PreconditionFailed {
            message: e.to_string(),
        })?;

        let analysis = match self.engine.analyze(&input).await {
            Ok(analysis) => analysis,
            Err(EngineError::InvalidOutput(e)) => return Err(Error::ModelOutputInvalid(e)),
            Err(EngineError::Model(e)) => return Err(Error::ModelUnavailable(e)),
        };

        let output = &analysis.output;
        let request = ReportCreateDBRequest {
            offer_id,
            user_id,
            summary: output.summary.clone(),
            validation_status: output.validation_status,
            validation_explanation: output.validation_explanation.clone(),
            bottlenecks: to_json(&output.bottlenecks)?,
            action_plan: to_json(&output.action_plan)?,
            missing_data: to_json(&output.missing_data)?,
            next_test_recommendations: output.next_test_recommendations.clone(),
            full_report: to_json(output)?,
            ai_model: self.engine.model_id().to_string(),
            prompt_tokens: analysis.usage.prompt_tokens,
            completion_tokens: analysis.usage.completion_tokens,
            total_tokens: analysis.usage.total_tokens,
            estimated_cost: analysis.usage.estimated_cost,
        };

        let report = self.reports.create(request).await?;
        info!(report_id = %report.id, total_tokens = report.total_tokens, "analysis report persisted");
        Ok(report)
    }

    /// Report history for an offer, newest first
    #[instrument(skip(self), fields(user_id = %user_id, offer_id = %offer_id))]
    pub async fn list_reports(&self, user_id: UserId, offer_id: OfferId) -> Result<Vec<ReportSummary>> {
        self.resolve_owned_offer(user_id, offer_id).await?;
        Ok(self.reports.list_for_offer(offer_id).await?)
    }

    /// A single stored report with its owning offer, ownership enforced
    #[instrument(skip(self), fields(user_id = %user_id, report_id = %report_id))]
    pub async fn get_report(&self, user_id: UserId, report_id: ReportId) -> Result<ReportDetail> {
        let report = self.reports.get(report_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Report".to_string(),
            id: report_id.to_string(),
        })?;

        if report.user_id != user_id {
            return Err(Error::Forbidden {
                resource: "report".to_string(),
            });
        }

        // Reports reference offers by FK; a missing offer means a corrupt store
        let offer = self.offers.get_offer(report.offer_id).await?.ok_or_else(|| Error::Internal {
            operation: format!("load offer {} for report {}", report.offer_id, report.id),
        })?;

        Ok(ReportDetail { report, offer })
    }

    async fn resolve_owned_offer(&self, user_id: UserId, offer_id: OfferId) -> Result<Offer> {
        let offer = self.offers.get_offer(offer_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Offer".to_string(),
            id: offer_id.to_string(),
        })?;

        if offer.user_id != user_id {
            return Err(Error::Forbidden {
                resource: "offer".to_string(),
            });
        }

        Ok(offer)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::Internal {
        operation: format!("serialize analysis report: {e}"),
    })
}
