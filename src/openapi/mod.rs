//! OpenAPI documentation configuration.
//!
//! The generated document is served as JSON at `/api-docs/openapi.json` with
//! an interactive UI at `/docs`.

use utoipa::OpenApi;

use crate::analysis::output::{ActionItem, AnalysisOutput, Bottleneck, Difficulty, FunnelStage, Severity, ValidationStatus};
use crate::api::models::analysis::{AnalysisResponse, UsageSummary};
use crate::api::models::reports::{OfferSummaryResponse, ReportListResponse, ReportResponse, ReportSummaryResponse, UsageDetail};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "offerlens API",
        description = "AI-powered performance analysis for marketing campaigns"
    ),
    paths(
        crate::api::handlers::analysis::analyze_offer,
        crate::api::handlers::reports::list_reports,
        crate::api::handlers::reports::get_report,
    ),
    components(schemas(
        AnalysisResponse,
        UsageSummary,
        UsageDetail,
        ReportResponse,
        ReportListResponse,
        ReportSummaryResponse,
        OfferSummaryResponse,
        AnalysisOutput,
        Bottleneck,
        ActionItem,
        ValidationStatus,
        FunnelStage,
        Severity,
        Difficulty,
    )),
    tags(
        (name = "analysis", description = "Run AI campaign analyses"),
        (name = "reports", description = "Read stored analysis reports"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/offers/{offer_id}/analyze".to_string()));
        assert!(paths.contains(&"/offers/{offer_id}/reports".to_string()));
        assert!(paths.contains(&"/reports/{report_id}".to_string()));
    }
}
