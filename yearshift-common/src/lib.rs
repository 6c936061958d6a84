//! # yearshift common library
//!
//! Shared code for the yearshift workspace including:
//! - Series and sample data model
//! - Query filters (metric, entity wildcard, date range)
//! - Timestamp parsing and calendar-year shifting
//! - Configuration loading and resolution

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use filter::{DateFilter, EntityFilter, SeriesFilter, SeriesQuery};
pub use model::{Aggregate, AggregatePeriod, Sample, Series};
