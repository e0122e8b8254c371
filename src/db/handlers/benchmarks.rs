//! Database repository for market benchmarks.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::models::benchmarks::Benchmark;

pub struct Benchmarks<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Benchmarks<'c> {
    /// Create a new Benchmarks repository instance
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Benchmarks applicable to a campaign scope.
    ///
    /// Union of two matching tiers: rows scoped to the exact (niche, country,
    /// traffic source, funnel type) combination, and niche-wide rows whose
    /// other scope columns are all NULL. No further filtering or ranking; the
    /// fixed ordering only keeps prompt text stable across identical requests.
    #[instrument(skip(self), err)]
    pub async fn find_for_scope(
        &mut self,
        niche: &str,
        country: &str,
        traffic_source: &str,
        funnel_type: &str,
    ) -> Result<Vec<Benchmark>> {
        let benchmarks = sqlx::query_as::<_, Benchmark>(
            r#"
            SELECT id, metric_name, niche, country, traffic_source, funnel_type,
                   min_value, ideal_value, max_value, created_at
            FROM benchmarks
            WHERE (niche = $1 AND country = $2 AND traffic_source = $3 AND funnel_type = $4)
               OR (niche = $1 AND country IS NULL AND traffic_source IS NULL AND funnel_type IS NULL)
            ORDER BY metric_name ASC, country ASC NULLS LAST
            "#,
        )
        .bind(niche)
        .bind(country)
        .bind(traffic_source)
        .bind(funnel_type)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(benchmarks)
    }
}
