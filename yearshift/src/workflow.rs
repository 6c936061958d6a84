//! Backfill workflow: query → shift → insert, one series at a time
//!
//! Series are processed strictly in the order the store returns them. The
//! first failed insert stops the run; series inserted before it stay
//! inserted.

use thiserror::Error;
use tracing::info;
use yearshift_common::config::BackfillSettings;
use yearshift_common::SeriesQuery;

use crate::client::{ClientError, SeriesStore};
use crate::transform::backfill_series;

/// What to backfill and how far forward
#[derive(Debug, Clone)]
pub struct BackfillPlan {
    pub query: SeriesQuery,
    /// Number of year offsets generated per sample (1..=years)
    pub years: u32,
    /// Transform and count, but never insert
    pub dry_run: bool,
}

impl BackfillPlan {
    pub fn new(query: SeriesQuery, years: u32) -> Self {
        Self {
            query,
            years,
            dry_run: false,
        }
    }

    pub fn from_settings(settings: &BackfillSettings, dry_run: bool) -> Self {
        Self {
            query: settings.query.clone(),
            years: settings.years,
            dry_run,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Counters for one backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub series_processed: usize,
    pub source_samples: usize,
    pub generated_samples: usize,
    /// Shifted copies dropped because the target date does not exist
    pub skipped_dates: usize,
    pub series_inserted: usize,
}

/// Backfill errors
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("Series query failed: {0}")]
    Query(#[source] ClientError),

    #[error("Insert failed for {metric}/{entity} ({inserted} series already inserted): {source}")]
    Insert {
        metric: String,
        entity: String,
        inserted: usize,
        source: ClientError,
    },
}

/// Run the backfill described by `plan` against `store`.
pub async fn run_backfill<S>(store: &S, plan: &BackfillPlan) -> Result<RunSummary, BackfillError>
where
    S: SeriesStore + ?Sized,
{
    let series_list = store.query(&plan.query).await.map_err(BackfillError::Query)?;

    info!(
        metric = %plan.query.series.metric,
        entity = %plan.query.entity.pattern,
        series = series_list.len(),
        years = plan.years,
        dry_run = plan.dry_run,
        "Query complete"
    );

    let mut summary = RunSummary::default();

    for series in &series_list {
        let (generated, skipped) = backfill_series(series, plan.years);

        summary.series_processed += 1;
        summary.source_samples += series.samples.len();
        summary.generated_samples += generated.samples.len();
        summary.skipped_dates += skipped.len();

        if plan.dry_run {
            info!(
                series = %series.label(),
                source = series.samples.len(),
                generated = generated.samples.len(),
                skipped = skipped.len(),
                "Dry run: insert skipped"
            );
            continue;
        }

        store
            .insert(&generated)
            .await
            .map_err(|source| BackfillError::Insert {
                metric: series.metric.clone(),
                entity: series.entity.clone(),
                inserted: summary.series_inserted,
                source,
            })?;
        summary.series_inserted += 1;

        info!(
            series = %series.label(),
            source = series.samples.len(),
            generated = generated.samples.len(),
            skipped = skipped.len(),
            "Series inserted"
        );
    }

    Ok(summary)
}
