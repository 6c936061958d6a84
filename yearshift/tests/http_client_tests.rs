//! HTTP client integration tests against an in-process mock service

mod helpers;

use axum::http::StatusCode;
use helpers::mock_server::{MockServer, EXPECTED_AUTH};
use helpers::{query, ts};
use serde_json::json;
use std::time::Duration;
use yearshift::{run_backfill, BackfillPlan, ClientError, HttpSeriesClient, SeriesStore};
use yearshift_common::config::ConnectionSettings;
use yearshift_common::{Sample, Series};

fn stored_series() -> serde_json::Value {
    json!([
        {
            "metric": "temperature",
            "entity": "sensor-1",
            "tags": { "site": "north" },
            "aggregate": { "type": "DETAIL" },
            "data": [
                { "d": "2018-06-15T00:00:00.000Z", "v": 10, "version": 1 },
                { "d": "2016-02-29T00:00:00.000Z", "v": 5, "version": 7 }
            ]
        },
        {
            "metric": "temperature",
            "entity": "sensor-2",
            "data": []
        }
    ])
}

#[tokio::test]
async fn test_query_sends_filter_and_basic_auth() {
    let server = MockServer::builder()
        .query_response(stored_series())
        .start()
        .await;
    let client = HttpSeriesClient::new(&server.connection()).unwrap();

    let series = client
        .query(&query("temperature", "*", ts(2016, 1, 1), ts(2019, 1, 1)))
        .await
        .unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].entity, "sensor-1");
    assert_eq!(series[0].tags.get("site").map(String::as_str), Some("north"));
    assert_eq!(series[0].samples[0], Sample::new(ts(2018, 6, 15), 10.0, Some(1)));
    assert!(series[1].samples.is_empty());

    assert_eq!(
        server.queries(),
        vec![json!([{
            "metric": "temperature",
            "entity": "*",
            "startDate": "2016-01-01T00:00:00.000Z",
            "endDate": "2019-01-01T00:00:00.000Z"
        }])]
    );
    assert_eq!(server.auth_headers(), vec![Some(EXPECTED_AUTH.to_string())]);
}

#[tokio::test]
async fn test_insert_sends_series_array() {
    let server = MockServer::builder().start().await;
    let client = HttpSeriesClient::new(&server.connection()).unwrap();

    let series = Series::new("temperature", "sensor-1")
        .with_tag("site", "north")
        .push(Sample::new(ts(2020, 2, 29), 5.0, Some(7)));
    client.insert(&series).await.unwrap();

    let inserts = server.inserts();
    assert_eq!(inserts.len(), 1);
    let body = &inserts[0];
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["metric"], json!("temperature"));
    assert_eq!(body[0]["entity"], json!("sensor-1"));
    assert_eq!(body[0]["tags"], json!({ "site": "north" }));
    assert!(body[0].get("aggregate").is_none());
    assert_eq!(body[0]["data"][0]["v"], json!(5.0));
    assert_eq!(body[0]["data"][0]["version"], json!(7));

    // Timestamp must round-trip to the same instant
    let sent: Sample = serde_json::from_value(body[0]["data"][0].clone()).unwrap();
    assert_eq!(sent.timestamp, ts(2020, 2, 29));
}

#[tokio::test]
async fn test_wrong_credentials_map_to_unauthorized() {
    let server = MockServer::builder().start().await;
    let mut connection = server.connection();
    connection.password = Some("wrong".to_string());
    let client = HttpSeriesClient::new(&connection).unwrap();

    let err = client
        .query(&query("temperature", "*", ts(2018, 1, 1), ts(2019, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn test_missing_credentials_map_to_unauthorized() {
    let server = MockServer::builder().start().await;
    let mut connection = server.connection();
    connection.username = None;
    connection.password = None;
    let client = HttpSeriesClient::new(&connection).unwrap();

    let err = client.insert(&Series::new("m", "e")).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert_eq!(server.auth_headers(), vec![None]);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::builder()
        .insert_status(StatusCode::BAD_REQUEST)
        .start()
        .await;
    let client = HttpSeriesClient::new(&server.connection()).unwrap();

    let err = client.insert(&Series::new("m", "e")).await.unwrap_err();
    match err {
        ClientError::ApiError(status, body) => {
            assert_eq!(status, 400);
            assert_eq!(body, "insert rejected");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_query_response_maps_to_parse_error() {
    let server = MockServer::builder()
        .query_response(json!({ "unexpected": true }))
        .start()
        .await;
    let client = HttpSeriesClient::new(&server.connection()).unwrap();

    let err = client
        .query(&query("temperature", "*", ts(2018, 1, 1), ts(2019, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ParseError(_)));
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network_error() {
    // Bind and drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpSeriesClient::new(&ConnectionSettings {
        url: format!("http://{}", addr),
        username: None,
        password: None,
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = client.insert(&Series::new("m", "e")).await.unwrap_err();
    assert!(matches!(err, ClientError::NetworkError(_)));
}

#[tokio::test]
async fn test_end_to_end_backfill_over_http() {
    let server = MockServer::builder()
        .query_response(stored_series())
        .start()
        .await;
    let client = HttpSeriesClient::new(&server.connection()).unwrap();
    let plan = BackfillPlan::new(
        query("temperature", "*", ts(2016, 1, 1), ts(2019, 1, 1)),
        4,
    );

    let summary = run_backfill(&client, &plan).await.unwrap();

    assert_eq!(summary.series_processed, 2);
    assert_eq!(summary.series_inserted, 2);
    // 2018-06-15: 4 copies; 2016-02-29: only 2020
    assert_eq!(summary.generated_samples, 5);
    assert_eq!(summary.skipped_dates, 3);

    let inserts = server.inserts();
    assert_eq!(inserts.len(), 2);
    assert!(inserts[0][0].get("aggregate").is_none());
    assert_eq!(inserts[0][0]["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(inserts[1][0]["entity"], json!("sensor-2"));
    assert_eq!(inserts[1][0]["data"], json!([]));
}
