//! Year-shift transform
//!
//! Each source sample yields one copy per offset `1..=years`, stamped with
//! the source timestamp moved forward by that many calendar years. Value and
//! version are copied unchanged. A copy whose target date does not exist
//! (Feb 29 into a non-leap year) is dropped and reported; the remaining
//! offsets are still produced.
//!
//! Output order is interleaved per source sample:
//! `s0+1, s0+2, .., s0+N, s1+1, .., s1+N, ..`

use chrono::{DateTime, Utc};
use tracing::warn;
use yearshift_common::time::{format_timestamp, shift_years};
use yearshift_common::{Sample, Series};

/// A shifted copy that could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedShift {
    /// Timestamp of the source sample
    pub source: DateTime<Utc>,
    /// Year offset that had no valid calendar date
    pub offset: u32,
}

/// Generated samples plus the offsets that were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftOutcome {
    pub samples: Vec<Sample>,
    pub skipped: Vec<SkippedShift>,
}

impl ShiftOutcome {
    fn extend(&mut self, other: ShiftOutcome) {
        self.samples.extend(other.samples);
        self.skipped.extend(other.skipped);
    }
}

/// Copies of `sample` shifted by 1, 2, .., `years` years, in offset order.
pub fn shift_sample(sample: &Sample, years: u32) -> ShiftOutcome {
    let mut outcome = ShiftOutcome::default();

    for offset in 1..=years {
        match shift_years(&sample.timestamp, offset) {
            Some(timestamp) => outcome.samples.push(sample.at(timestamp)),
            None => {
                warn!(
                    date = %format_timestamp(&sample.timestamp),
                    offset,
                    "Skipping shifted sample: no such calendar date"
                );
                outcome.skipped.push(SkippedShift {
                    source: sample.timestamp,
                    offset,
                });
            }
        }
    }

    outcome
}

/// Shift every sample, keeping source order and per-sample offset order.
pub fn shift_samples(samples: &[Sample], years: u32) -> ShiftOutcome {
    let mut outcome = ShiftOutcome::default();
    for sample in samples {
        outcome.extend(shift_sample(sample, years));
    }
    outcome
}

/// Build the series to insert for `series`.
///
/// The result has the source identity and tags, the generated samples only,
/// and no aggregate metadata. The source series is not modified.
pub fn backfill_series(series: &Series, years: u32) -> (Series, Vec<SkippedShift>) {
    let outcome = shift_samples(&series.samples, years);
    (series.with_samples(outcome.samples), outcome.skipped)
}
