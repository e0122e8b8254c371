//! Database repository for offers and their metrics snapshots.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::models::offers::{Offer, OfferMetrics};
use crate::types::{abbrev_uuid, OfferId};

pub struct Offers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Offers<'c> {
    /// Create a new Offers repository instance
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Get an offer by ID
    #[instrument(skip(self), fields(offer_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: OfferId) -> Result<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            SELECT id, user_id, name, niche, country, traffic_source, funnel_type,
                   budget, start_date, end_date, created_at, updated_at
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(offer)
    }

    /// Latest metrics snapshot for an offer, if any has been recorded
    #[instrument(skip(self), fields(offer_id = %abbrev_uuid(&offer_id)), err)]
    pub async fn get_latest_metrics(&mut self, offer_id: OfferId) -> Result<Option<OfferMetrics>> {
        let metrics = sqlx::query_as::<_, OfferMetrics>(
            r#"
            SELECT id, offer_id, impressions, clicks, leads, sales, revenue, cost,
                   ctr, cpc, cpm, conversion_rate, roas, aov, created_at, updated_at
            FROM offer_metrics
            WHERE offer_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(metrics)
    }
}
