//! In-process stand-in for the time-series service REST API
//!
//! Serves `/api/v1/series/query` and `/api/v1/series/insert` on an ephemeral
//! localhost port and records every request body and Authorization header.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use yearshift_common::config::ConnectionSettings;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
/// `Basic base64("admin:secret")`
pub const EXPECTED_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

#[derive(Default)]
struct Recorded {
    queries: Vec<Value>,
    inserts: Vec<Value>,
    auth_headers: Vec<Option<String>>,
}

struct MockState {
    query_response: Value,
    query_status: StatusCode,
    insert_status: StatusCode,
    recorded: Mutex<Recorded>,
}

/// Running mock server
pub struct MockServer {
    pub url: String,
    state: Arc<MockState>,
}

/// Builder for [`MockServer`]
pub struct MockServerBuilder {
    query_response: Value,
    query_status: StatusCode,
    insert_status: StatusCode,
}

impl MockServerBuilder {
    pub fn query_response(mut self, body: Value) -> Self {
        self.query_response = body;
        self
    }

    pub fn query_status(mut self, status: StatusCode) -> Self {
        self.query_status = status;
        self
    }

    pub fn insert_status(mut self, status: StatusCode) -> Self {
        self.insert_status = status;
        self
    }

    pub async fn start(self) -> MockServer {
        let state = Arc::new(MockState {
            query_response: self.query_response,
            query_status: self.query_status,
            insert_status: self.insert_status,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/api/v1/series/query", post(query_handler))
            .route("/api/v1/series/insert", post(insert_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockServer {
            url: format!("http://{}", addr),
            state,
        }
    }
}

impl MockServer {
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder {
            query_response: Value::Array(Vec::new()),
            query_status: StatusCode::OK,
            insert_status: StatusCode::OK,
        }
    }

    /// Connection settings pointing at this server with valid credentials
    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            url: self.url.clone(),
            username: Some(USERNAME.to_string()),
            password: Some(PASSWORD.to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn queries(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().queries.clone()
    }

    pub fn inserts(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().inserts.clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.recorded.lock().unwrap().auth_headers.clone()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn authorized(header: &Option<String>) -> bool {
    header.as_deref() == Some(EXPECTED_AUTH)
}

async fn query_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = authorization(&headers);
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.queries.push(body);
        recorded.auth_headers.push(auth.clone());
    }

    if !authorized(&auth) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !state.query_status.is_success() {
        return (state.query_status, "query rejected").into_response();
    }
    Json(state.query_response.clone()).into_response()
}

async fn insert_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = authorization(&headers);
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.inserts.push(body);
        recorded.auth_headers.push(auth.clone());
    }

    if !authorized(&auth) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !state.insert_status.is_success() {
        return (state.insert_status, "insert rejected").into_response();
    }
    StatusCode::OK.into_response()
}
