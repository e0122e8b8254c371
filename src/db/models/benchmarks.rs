//! Database models for market benchmarks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Metric a benchmark range applies to, stored as TEXT in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Ctr,
    Cpc,
    Cpm,
    ConversionRate,
    Roas,
    Aov,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::Ctr => "ctr",
            MetricName::Cpc => "cpc",
            MetricName::Cpm => "cpm",
            MetricName::ConversionRate => "conversion_rate",
            MetricName::Roas => "roas",
            MetricName::Aov => "aov",
        };
        write!(f, "{name}")
    }
}

/// A market reference range for one metric.
///
/// Scope columns (`country`, `traffic_source`, `funnel_type`) are nullable: a
/// row with all three NULL is a "global" benchmark for its niche.
#[derive(Debug, Clone, FromRow)]
pub struct Benchmark {
    pub id: Uuid,
    pub metric_name: MetricName,
    pub niche: String,
    pub country: Option<String>,
    pub traffic_source: Option<String>,
    pub funnel_type: Option<String>,
    pub min_value: Decimal,
    pub ideal_value: Decimal,
    pub max_value: Decimal,
    pub created_at: DateTime<Utc>,
}
