//! Postgres-backed implementations of the analysis service's store traits.
//!
//! Thin adapters: each acquires a connection from the pool and delegates to
//! the matching repository in [`crate::db::handlers`].

use async_trait::async_trait;
use sqlx::PgPool;

use crate::analysis::service::{BenchmarkStore, OfferStore, ReportStore};
use crate::db::errors::Result;
use crate::db::handlers::{Benchmarks, Offers, Reports};
use crate::db::models::benchmarks::Benchmark;
use crate::db::models::offers::{Offer, OfferMetrics};
use crate::db::models::reports::{Report, ReportCreateDBRequest, ReportSummary};
use crate::types::{OfferId, ReportId};

#[derive(Clone)]
pub struct PgOfferStore {
    pool: PgPool,
}

impl PgOfferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferStore for PgOfferStore {
    async fn get_offer(&self, offer_id: OfferId) -> Result<Option<Offer>> {
        let mut conn = self.pool.acquire().await?;
        Offers::new(&mut conn).get_by_id(offer_id).await
    }

    async fn get_latest_metrics(&self, offer_id: OfferId) -> Result<Option<OfferMetrics>> {
        let mut conn = self.pool.acquire().await?;
        Offers::new(&mut conn).get_latest_metrics(offer_id).await
    }
}

#[derive(Clone)]
pub struct PgBenchmarkStore {
    pool: PgPool,
}

impl PgBenchmarkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BenchmarkStore for PgBenchmarkStore {
    async fn find_for_offer(&self, offer: &Offer) -> Result<Vec<Benchmark>> {
        let mut conn = self.pool.acquire().await?;
        Benchmarks::new(&mut conn)
            .find_for_scope(&offer.niche, &offer.country, &offer.traffic_source, &offer.funnel_type)
            .await
    }
}

#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create(&self, request: ReportCreateDBRequest) -> Result<Report> {
        let mut conn = self.pool.acquire().await?;
        Reports::new(&mut conn).create(&request).await
    }

    async fn list_for_offer(&self, offer_id: OfferId) -> Result<Vec<ReportSummary>> {
        let mut conn = self.pool.acquire().await?;
        Reports::new(&mut conn).list_by_offer(offer_id).await
    }

    async fn get(&self, report_id: ReportId) -> Result<Option<Report>> {
        let mut conn = self.pool.acquire().await?;
        Reports::new(&mut conn).get_by_id(report_id).await
    }
}
