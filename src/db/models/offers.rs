//! Database models for offers and their metrics snapshots.

use crate::types::{OfferId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// A stored marketing offer (campaign) row
#[derive(Debug, Clone, FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub user_id: UserId,
    pub name: String,
    pub niche: String,
    pub country: String,
    pub traffic_source: String,
    pub funnel_type: String,
    pub budget: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single measured-performance snapshot associated with an offer.
///
/// Raw counters are non-negative integers (enforced by CHECK constraints);
/// derived ratios are nullable and computed by the metrics ingestion layer.
#[derive(Debug, Clone, FromRow)]
pub struct OfferMetrics {
    pub id: uuid::Uuid,
    pub offer_id: OfferId,
    pub impressions: i64,
    pub clicks: i64,
    pub leads: i64,
    pub sales: i64,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub ctr: Option<Decimal>,
    pub cpc: Option<Decimal>,
    pub cpm: Option<Decimal>,
    pub conversion_rate: Option<Decimal>,
    pub roas: Option<Decimal>,
    pub aov: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
