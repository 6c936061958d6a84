//! Shared helpers for yearshift integration tests

#![allow(dead_code)]

pub mod mock_server;

use chrono::{DateTime, TimeZone, Utc};
use yearshift_common::{DateFilter, EntityFilter, SeriesFilter, SeriesQuery};

pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn query(metric: &str, entity: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> SeriesQuery {
    SeriesQuery::new(
        SeriesFilter::new(metric).unwrap(),
        EntityFilter::new(entity).unwrap(),
        DateFilter::new(start, end).unwrap(),
    )
}
