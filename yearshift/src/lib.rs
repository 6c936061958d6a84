//! yearshift library interface
//!
//! Query a metric's series for a date range, copy every sample forward by
//! 1..=N calendar years and write the generated series back.
//!
//! The binary in `main.rs` wires these pieces to configuration and logging;
//! everything here is exposed for integration testing.

pub mod cli;
pub mod client;
pub mod transform;
pub mod workflow;

pub use client::{ClientError, HttpSeriesClient, InMemoryStore, SeriesStore};
pub use transform::{backfill_series, shift_sample, shift_samples, ShiftOutcome, SkippedShift};
pub use workflow::{run_backfill, BackfillError, BackfillPlan, RunSummary};
