//! Series data model
//!
//! The wire shape mirrors the remote service's JSON: samples are
//! `{"d": <timestamp>, "v": <value>, "version": <n>?}` and a series carries
//! its samples under `data`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One timestamped data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample time (UTC)
    #[serde(rename = "d")]
    pub timestamp: DateTime<Utc>,
    /// Sample value
    #[serde(rename = "v")]
    pub value: f64,
    /// Optional version number attached by the remote service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, version: Option<i64>) -> Self {
        Self {
            timestamp,
            value,
            version,
        }
    }

    /// Copy of this sample at a different time; value and version unchanged
    pub fn at(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            value: self.value,
            version: self.version,
        }
    }
}

/// Rollup period, e.g. `{ "count": 1, "unit": "HOUR" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatePeriod {
    pub count: u32,
    pub unit: String,
}

/// Aggregate metadata the remote service attaches to rolled-up series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Aggregation function name (e.g. `AVG`, `DETAIL`)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<AggregatePeriod>,
}

/// Ordered samples for one metric/entity pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub metric: String,
    pub entity: String,
    /// Series tags; part of the series identity on the remote side
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    #[serde(rename = "data", default)]
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(metric: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            entity: entity.into(),
            tags: BTreeMap::new(),
            aggregate: None,
            samples: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn push(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self
    }

    /// New series with the same identity and tags holding `samples`.
    ///
    /// Aggregate metadata is not carried over: it describes the source
    /// samples, not the replacement list. `self` is left untouched.
    pub fn with_samples(&self, samples: Vec<Sample>) -> Self {
        Self {
            metric: self.metric.clone(),
            entity: self.entity.clone(),
            tags: self.tags.clone(),
            aggregate: None,
            samples,
        }
    }

    /// `metric/entity` label for log lines and error messages
    pub fn label(&self) -> String {
        format!("{}/{}", self.metric, self.entity)
    }
}
