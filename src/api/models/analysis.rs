//! API models for analysis requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::output::AnalysisOutput;
use crate::db::models::reports::Report;
use crate::errors::Error;
use crate::types::ReportId;

/// Token and cost accounting for one analysis, as presented to clients.
///
/// The cost is a display string with a currency marker and fixed 6 decimal
/// places; exact Decimal arithmetic stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsageSummary {
    /// Total tokens consumed (prompt + completion)
    pub tokens_used: i64,
    /// e.g. "$0.000413"
    pub estimated_cost: String,
}

/// Response payload for a freshly completed analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    #[schema(value_type = uuid::Uuid)]
    pub report_id: ReportId,
    /// The full validated analysis verdict
    pub analysis: AnalysisOutput,
    pub usage: UsageSummary,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Report> for AnalysisResponse {
    type Error = Error;

    fn try_from(report: Report) -> Result<Self, Error> {
        // The stored full_report was serialized from a validated AnalysisOutput,
        // so a failure here means the row was corrupted out of band
        let analysis: AnalysisOutput = serde_json::from_value(report.full_report).map_err(|e| Error::Internal {
            operation: format!("deserialize stored report {}: {e}", report.id),
        })?;

        Ok(Self {
            report_id: report.id,
            analysis,
            usage: UsageSummary {
                tokens_used: report.total_tokens,
                estimated_cost: format!("${:.6}", report.estimated_cost),
            },
            created_at: report.created_at,
        })
    }
}
