//! API models for stored report reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::output::ValidationStatus;
use crate::analysis::service::ReportDetail;
use crate::api::models::analysis::UsageSummary;
use crate::db::models::reports::ReportSummary;
use crate::types::{OfferId, ReportId};

/// One entry in an offer's report history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportSummaryResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: ReportId,
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub ai_model: String,
    pub usage: UsageSummary,
    pub created_at: DateTime<Utc>,
}

impl From<ReportSummary> for ReportSummaryResponse {
    fn from(row: ReportSummary) -> Self {
        Self {
            id: row.id,
            summary: row.summary,
            validation_status: row.validation_status,
            ai_model: row.ai_model,
            usage: UsageSummary {
                tokens_used: row.total_tokens,
                estimated_cost: format!("${:.6}", row.estimated_cost),
            },
            created_at: row.created_at,
        }
    }
}

/// An offer's report history with its total count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponse {
    pub count: usize,
    pub reports: Vec<ReportSummaryResponse>,
}

impl From<Vec<ReportSummary>> for ReportListResponse {
    fn from(rows: Vec<ReportSummary>) -> Self {
        let reports: Vec<ReportSummaryResponse> = rows.into_iter().map(ReportSummaryResponse::from).collect();
        Self {
            count: reports.len(),
            reports,
        }
    }
}

/// The campaign a report belongs to, reduced to identification fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferSummaryResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: OfferId,
    pub name: String,
    pub niche: String,
    pub country: String,
}

/// Full token breakdown and cost for one stored report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsageDetail {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub tokens_used: i64,
    /// e.g. "$0.000413"
    pub estimated_cost: String,
}

/// A full stored report together with its owning offer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: ReportId,
    pub offer: OfferSummaryResponse,
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub validation_explanation: String,
    #[schema(value_type = Object)]
    pub bottlenecks: serde_json::Value,
    #[schema(value_type = Object)]
    pub action_plan: serde_json::Value,
    #[schema(value_type = Object)]
    pub missing_data: serde_json::Value,
    pub next_test_recommendations: String,
    pub ai_model: String,
    pub usage: UsageDetail,
    pub created_at: DateTime<Utc>,
}

impl From<ReportDetail> for ReportResponse {
    fn from(detail: ReportDetail) -> Self {
        let ReportDetail { report, offer } = detail;
        Self {
            id: report.id,
            offer: OfferSummaryResponse {
                id: offer.id,
                name: offer.name,
                niche: offer.niche,
                country: offer.country,
            },
            summary: report.summary,
            validation_status: report.validation_status,
            validation_explanation: report.validation_explanation,
            bottlenecks: report.bottlenecks,
            action_plan: report.action_plan,
            missing_data: report.missing_data,
            next_test_recommendations: report.next_test_recommendations,
            ai_model: report.ai_model,
            usage: UsageDetail {
                prompt_tokens: report.prompt_tokens,
                completion_tokens: report.completion_tokens,
                tokens_used: report.total_tokens,
                estimated_cost: format!("${:.6}", report.estimated_cost),
            },
            created_at: report.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::test_fixtures::test_offer;
    use crate::db::models::reports::Report;
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    fn stored_summary(total_tokens: i64) -> ReportSummary {
        ReportSummary {
            id: Uuid::new_v4(),
            summary: "Campaign is performing above market benchmarks overall.".to_string(),
            validation_status: ValidationStatus::Validated,
            ai_model: "gemini-2.5-flash".to_string(),
            total_tokens,
            estimated_cost: Decimal::new(413, 6),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_response_carries_count() {
        let response = ReportListResponse::from(vec![stored_summary(2000), stored_summary(1500)]);
        assert_eq!(response.count, 2);
        assert_eq!(response.reports.len(), 2);
        assert_eq!(response.reports[0].usage.estimated_cost, "$0.000413");

        let empty = ReportListResponse::from(Vec::new());
        assert_eq!(empty.count, 0);
    }

    #[test]
    fn test_report_response_carries_offer_summary_and_token_breakdown() {
        let offer = test_offer(Uuid::new_v4());
        let report = Report {
            id: Uuid::new_v4(),
            offer_id: offer.id,
            user_id: offer.user_id,
            summary: "Campaign is performing above market benchmarks overall.".to_string(),
            validation_status: ValidationStatus::Validated,
            validation_explanation: "ROAS clears the validation threshold.".to_string(),
            bottlenecks: json!([]),
            action_plan: json!([]),
            missing_data: json!([]),
            next_test_recommendations: "Run a headline test next.".to_string(),
            full_report: json!({}),
            ai_model: "gemini-2.5-flash".to_string(),
            prompt_tokens: 1200,
            completion_tokens: 800,
            total_tokens: 2000,
            estimated_cost: Decimal::new(33, 5),
            created_at: Utc::now(),
        };

        let response = ReportResponse::from(ReportDetail {
            report,
            offer: offer.clone(),
        });
        assert_eq!(response.offer.id, offer.id);
        assert_eq!(response.offer.name, "Keto Cookbook Launch");
        assert_eq!(response.offer.niche, "health");
        assert_eq!(response.offer.country, "US");
        assert_eq!(response.usage.prompt_tokens, 1200);
        assert_eq!(response.usage.completion_tokens, 800);
        assert_eq!(response.usage.tokens_used, 2000);
        assert_eq!(response.usage.estimated_cost, "$0.000330");
    }
}
