//! Database repository for persisted analysis reports.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::models::reports::{Report, ReportCreateDBRequest, ReportSummary};
use crate::types::{abbrev_uuid, OfferId, ReportId};

pub struct Reports<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reports<'c> {
    /// Create a new Reports repository instance
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Persist a freshly generated report
    #[instrument(skip(self, request), fields(offer_id = %request.offer_id, user_id = %request.user_id), err)]
    pub async fn create(&mut self, request: &ReportCreateDBRequest) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO ai_reports (
                offer_id, user_id, summary, validation_status, validation_explanation,
                bottlenecks, action_plan, missing_data, next_test_recommendations,
                full_report, ai_model, prompt_tokens, completion_tokens, total_tokens,
                estimated_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, offer_id, user_id, summary, validation_status, validation_explanation,
                      bottlenecks, action_plan, missing_data, next_test_recommendations,
                      full_report, ai_model, prompt_tokens, completion_tokens, total_tokens,
                      estimated_cost, created_at
            "#,
        )
        .bind(request.offer_id)
        .bind(request.user_id)
        .bind(&request.summary)
        .bind(request.validation_status)
        .bind(&request.validation_explanation)
        .bind(&request.bottlenecks)
        .bind(&request.action_plan)
        .bind(&request.missing_data)
        .bind(&request.next_test_recommendations)
        .bind(&request.full_report)
        .bind(&request.ai_model)
        .bind(request.prompt_tokens)
        .bind(request.completion_tokens)
        .bind(request.total_tokens)
        .bind(request.estimated_cost)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(report)
    }

    /// Report history for an offer, newest first
    #[instrument(skip(self), fields(offer_id = %abbrev_uuid(&offer_id)), err)]
    pub async fn list_by_offer(&mut self, offer_id: OfferId) -> Result<Vec<ReportSummary>> {
        let reports = sqlx::query_as::<_, ReportSummary>(
            r#"
            SELECT id, summary, validation_status, ai_model, total_tokens, estimated_cost, created_at
            FROM ai_reports
            WHERE offer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(offer_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reports)
    }

    /// Get a report by ID
    #[instrument(skip(self), fields(report_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: ReportId) -> Result<Option<Report>> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, offer_id, user_id, summary, validation_status, validation_explanation,
                   bottlenecks, action_plan, missing_data, next_test_recommendations,
                   full_report, ai_model, prompt_tokens, completion_tokens, total_tokens,
                   estimated_cost, created_at
            FROM ai_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(report)
    }
}
