//! Series selection filters
//!
//! A query is the conjunction of three independent predicates: metric name,
//! entity pattern and date range. Remote stores evaluate them server-side;
//! `matches` gives the same answer locally for in-memory stores.

use chrono::{DateTime, Utc};

use crate::model::{Sample, Series};
use crate::{Error, Result};

/// Metric predicate (exact name, case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFilter {
    pub metric: String,
}

impl SeriesFilter {
    pub fn new(metric: impl Into<String>) -> Result<Self> {
        let metric = metric.into();
        if metric.trim().is_empty() {
            return Err(Error::InvalidInput("metric name must not be empty".to_string()));
        }
        Ok(Self { metric })
    }

    pub fn matches(&self, metric: &str) -> bool {
        self.metric.eq_ignore_ascii_case(metric)
    }
}

/// Entity predicate with `*` / `?` wildcards (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFilter {
    pub pattern: String,
}

impl EntityFilter {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(Error::InvalidInput("entity pattern must not be empty".to_string()));
        }
        Ok(Self { pattern })
    }

    pub fn matches(&self, entity: &str) -> bool {
        wildcard_match(&self.pattern, entity)
    }
}

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateFilter {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidInput(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp < self.end
    }
}

/// Conjunction of the three predicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    pub series: SeriesFilter,
    pub entity: EntityFilter,
    pub date: DateFilter,
}

impl SeriesQuery {
    pub fn new(series: SeriesFilter, entity: EntityFilter, date: DateFilter) -> Self {
        Self {
            series,
            entity,
            date,
        }
    }

    /// Whether the series identity matches the metric and entity predicates
    pub fn selects(&self, series: &Series) -> bool {
        self.series.matches(&series.metric) && self.entity.matches(&series.entity)
    }

    /// Samples of `series` that fall inside the date range, in original order
    pub fn samples_in_range<'a>(&self, series: &'a Series) -> impl Iterator<Item = &'a Sample> + 'a {
        let date = self.date;
        series.samples.iter().filter(move |s| date.contains(&s.timestamp))
    }
}

/// Glob match supporting `*` (any run, possibly empty) and `?` (one char).
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` seen and the text index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, t));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
