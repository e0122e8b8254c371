//! Assembly of the bounded analysis context handed to the model.
//!
//! Maps raw stored records (offer, metrics snapshot, matching benchmarks) into
//! an immutable [`AnalysisInput`]. Assembly is deterministic: identical rows
//! always produce an identical input, which in turn guarantees byte-identical
//! prompt text downstream.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::models::benchmarks::{Benchmark, MetricName};
use crate::db::models::offers::{Offer, OfferMetrics};

/// An offer must have measured performance before it can be analyzed
#[derive(Debug, Error)]
#[error("offer has no metrics snapshot")]
pub struct MissingMetrics;

/// Campaign facts for the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct OfferContext {
    pub name: String,
    pub niche: String,
    pub country: String,
    pub traffic_source: String,
    pub funnel_type: String,
    /// Absent means "not informed", which is itself meaningful to the prompt
    pub budget: Option<Decimal>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Measured performance for the prompt. Nullable source ratios are coerced to
/// zero here, never silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsContext {
    pub impressions: i64,
    pub clicks: i64,
    pub leads: i64,
    pub sales: i64,
    pub ctr: Decimal,
    pub cpc: Decimal,
    pub cpm: Decimal,
    pub conversion_rate: Decimal,
    pub roas: Decimal,
    pub aov: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
}

/// A market reference range for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkContext {
    pub metric_name: MetricName,
    pub min_value: Decimal,
    pub ideal_value: Decimal,
    pub max_value: Decimal,
}

/// The complete analysis context, immutable once built.
///
/// An empty benchmark list is a legal state ("no market data"), rendered
/// explicitly in the prompt rather than hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub offer: OfferContext,
    pub metrics: MetricsContext,
    pub benchmarks: Vec<BenchmarkContext>,
}

impl AnalysisInput {
    /// Builds the analysis context from stored rows.
    ///
    /// Fails with [`MissingMetrics`] when the offer has no metrics snapshot.
    /// Benchmarks keep their retrieval order so prompt text stays stable.
    pub fn assemble(offer: &Offer, metrics: Option<&OfferMetrics>, benchmarks: &[Benchmark]) -> Result<Self, MissingMetrics> {
        let metrics = metrics.ok_or(MissingMetrics)?;

        Ok(Self {
            offer: OfferContext {
                name: offer.name.clone(),
                niche: offer.niche.clone(),
                country: offer.country.clone(),
                traffic_source: offer.traffic_source.clone(),
                funnel_type: offer.funnel_type.clone(),
                budget: offer.budget,
                start_date: offer.start_date,
                end_date: offer.end_date,
            },
            metrics: MetricsContext {
                impressions: metrics.impressions,
                clicks: metrics.clicks,
                leads: metrics.leads,
                sales: metrics.sales,
                ctr: metrics.ctr.unwrap_or(Decimal::ZERO),
                cpc: metrics.cpc.unwrap_or(Decimal::ZERO),
                cpm: metrics.cpm.unwrap_or(Decimal::ZERO),
                conversion_rate: metrics.conversion_rate.unwrap_or(Decimal::ZERO),
                roas: metrics.roas.unwrap_or(Decimal::ZERO),
                aov: metrics.aov.unwrap_or(Decimal::ZERO),
                revenue: metrics.revenue,
                cost: metrics.cost,
            },
            benchmarks: benchmarks
                .iter()
                .map(|b| BenchmarkContext {
                    metric_name: b.metric_name,
                    min_value: b.min_value,
                    ideal_value: b.ideal_value,
                    max_value: b.max_value,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    pub fn test_offer(user_id: Uuid) -> Offer {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        Offer {
            id: Uuid::new_v4(),
            user_id,
            name: "Keto Cookbook Launch".to_string(),
            niche: "health".to_string(),
            country: "US".to_string(),
            traffic_source: "facebook".to_string(),
            funnel_type: "vsl".to_string(),
            budget: Some(Decimal::new(5000, 0)),
            start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            end_date: None,
            created_at: created,
            updated_at: created,
        }
    }

    pub fn test_metrics(offer_id: Uuid) -> OfferMetrics {
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        OfferMetrics {
            id: Uuid::new_v4(),
            offer_id,
            impressions: 10_000,
            clicks: 100,
            leads: 40,
            sales: 12,
            revenue: Decimal::new(1_750, 0),
            cost: Decimal::new(500, 0),
            ctr: Some(Decimal::new(100, 2)),             // 1.00
            cpc: Some(Decimal::new(500, 2)),             // 5.00
            cpm: Some(Decimal::new(5000, 2)),            // 50.00
            conversion_rate: Some(Decimal::new(1200, 2)), // 12.00
            roas: Some(Decimal::new(350, 2)),            // 3.50
            aov: Some(Decimal::new(14583, 2)),           // 145.83
            created_at: created,
            updated_at: created,
        }
    }

    pub fn test_benchmark(metric_name: MetricName, ideal: Decimal) -> Benchmark {
        Benchmark {
            id: Uuid::new_v4(),
            metric_name,
            niche: "health".to_string(),
            country: Some("US".to_string()),
            traffic_source: Some("facebook".to_string()),
            funnel_type: Some("vsl".to_string()),
            min_value: ideal / Decimal::new(2, 0),
            ideal_value: ideal,
            max_value: ideal * Decimal::new(2, 0),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}
