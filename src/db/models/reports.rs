//! Database models for persisted AI analysis reports.

use crate::analysis::output::ValidationStatus;
use crate::types::{OfferId, ReportId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for persisting a freshly generated report.
///
/// The analysis fields arrive flattened (plus the full report as JSONB) so the
/// common listing columns can be read without unpacking JSON.
#[derive(Debug, Clone)]
pub struct ReportCreateDBRequest {
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub validation_explanation: String,
    pub bottlenecks: serde_json::Value,
    pub action_plan: serde_json::Value,
    pub missing_data: serde_json::Value,
    pub next_test_recommendations: String,
    pub full_report: serde_json::Value,
    pub ai_model: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub estimated_cost: Decimal,
}

/// A persisted report row
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: ReportId,
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub validation_explanation: String,
    pub bottlenecks: serde_json::Value,
    pub action_plan: serde_json::Value,
    pub missing_data: serde_json::Value,
    pub next_test_recommendations: String,
    pub full_report: serde_json::Value,
    pub ai_model: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub estimated_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Reduced row for report history listings
#[derive(Debug, Clone, FromRow)]
pub struct ReportSummary {
    pub id: ReportId,
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub ai_model: String,
    pub total_tokens: i64,
    pub estimated_cost: Decimal,
    pub created_at: DateTime<Utc>,
}
