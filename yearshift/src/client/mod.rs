//! Remote series store boundary
//!
//! The backfill workflow talks to the time-series service only through
//! [`SeriesStore`]. [`HttpSeriesClient`] is the production implementation;
//! [`InMemoryStore`] evaluates the same filters locally.

mod http;
mod memory;

pub use http::HttpSeriesClient;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use yearshift_common::{Series, SeriesQuery};

/// Series store errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication rejected by server")]
    Unauthorized,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read and write access to a remote time-series store
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// All series matching `query`, in the order the store returns them.
    async fn query(&self, query: &SeriesQuery) -> Result<Vec<Series>, ClientError>;

    /// Write `series` under its metric/entity identity.
    async fn insert(&self, series: &Series) -> Result<(), ClientError>;
}
