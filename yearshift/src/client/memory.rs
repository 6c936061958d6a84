//! In-process series store
//!
//! Evaluates queries with the same filter semantics the remote service uses
//! and applies inserts as upserts keyed by sample timestamp. Every insert is
//! also recorded in call order so callers can inspect exactly what was sent.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use yearshift_common::{Series, SeriesQuery};

use super::{ClientError, SeriesStore};

#[derive(Default)]
struct StoreState {
    series: Vec<Series>,
    insert_log: Vec<Series>,
    insert_attempts: usize,
}

/// Series store held in memory
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    /// 1-based insert call that fails with a server error
    fail_insert_at: Option<usize>,
}

impl InMemoryStore {
    pub fn new(series: Vec<Series>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                series,
                ..Default::default()
            }),
            fail_insert_at: None,
        }
    }

    /// Make the `call`-th insert (1-based) fail; earlier inserts succeed
    pub fn failing_insert(mut self, call: usize) -> Self {
        self.fail_insert_at = Some(call);
        self
    }

    /// Series passed to successful `insert` calls, in call order
    pub async fn inserted(&self) -> Vec<Series> {
        self.state.lock().await.insert_log.clone()
    }

    /// Current contents of the store
    pub async fn snapshot(&self) -> Vec<Series> {
        self.state.lock().await.series.clone()
    }
}

fn same_identity(a: &Series, b: &Series) -> bool {
    a.metric.eq_ignore_ascii_case(&b.metric)
        && a.entity.eq_ignore_ascii_case(&b.entity)
        && a.tags == b.tags
}

#[async_trait]
impl SeriesStore for InMemoryStore {
    async fn query(&self, query: &SeriesQuery) -> Result<Vec<Series>, ClientError> {
        let state = self.state.lock().await;

        // Selected series are returned even when no sample falls in range
        let result: Vec<Series> = state
            .series
            .iter()
            .filter(|series| query.selects(series))
            .map(|series| {
                let mut selected = series.clone();
                selected.samples = query.samples_in_range(series).cloned().collect();
                selected
            })
            .collect();

        debug!(count = result.len(), "In-memory query");
        Ok(result)
    }

    async fn insert(&self, series: &Series) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.insert_attempts += 1;

        if self.fail_insert_at == Some(state.insert_attempts) {
            return Err(ClientError::ApiError(
                500,
                format!("insert rejected for {}", series.label()),
            ));
        }

        match state.series.iter().position(|s| same_identity(s, series)) {
            Some(index) => {
                let existing = &mut state.series[index];
                for sample in &series.samples {
                    match existing
                        .samples
                        .iter_mut()
                        .find(|s| s.timestamp == sample.timestamp)
                    {
                        Some(slot) => *slot = sample.clone(),
                        None => existing.samples.push(sample.clone()),
                    }
                }
                existing.samples.sort_by_key(|s| s.timestamp);
            }
            None => state.series.push(series.clone()),
        }

        state.insert_log.push(series.clone());
        Ok(())
    }
}
