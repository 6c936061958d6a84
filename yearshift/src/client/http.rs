//! HTTP client for the time-series service REST API
//!
//! Both endpoints take a JSON array and authenticate with HTTP basic auth:
//! - `POST /api/v1/series/query`  body `[{"metric","entity","startDate","endDate"}]`
//! - `POST /api/v1/series/insert` body `[series]`

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::debug;
use yearshift_common::config::ConnectionSettings;
use yearshift_common::time::format_timestamp;
use yearshift_common::{Series, SeriesQuery};

use super::{ClientError, SeriesStore};

const QUERY_PATH: &str = "/api/v1/series/query";
const INSERT_PATH: &str = "/api/v1/series/insert";
const USER_AGENT: &str = concat!("yearshift/", env!("CARGO_PKG_VERSION"));

/// One element of the query request array
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    metric: &'a str,
    entity: &'a str,
    start_date: String,
    end_date: String,
}

impl<'a> From<&'a SeriesQuery> for QueryRequest<'a> {
    fn from(query: &'a SeriesQuery) -> Self {
        Self {
            metric: &query.series.metric,
            entity: &query.entity.pattern,
            start_date: format_timestamp(&query.date.start),
            end_date: format_timestamp(&query.date.end),
        }
    }
}

/// Time-series service client
pub struct HttpSeriesClient {
    http_client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpSeriesClient {
    pub fn new(settings: &ConnectionSettings) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.http_client.post(format!("{}{}", self.base_url, path));
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_ref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl SeriesStore for HttpSeriesClient {
    async fn query(&self, query: &SeriesQuery) -> Result<Vec<Series>, ClientError> {
        let body = [QueryRequest::from(query)];

        debug!(
            metric = %query.series.metric,
            entity = %query.entity.pattern,
            start = %body[0].start_date,
            end = %body[0].end_date,
            "Querying series"
        );

        let response = self.send(self.post(QUERY_PATH).json(&body)).await?;

        let series: Vec<Series> = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;

        debug!(count = series.len(), "Query returned series");
        Ok(series)
    }

    async fn insert(&self, series: &Series) -> Result<(), ClientError> {
        debug!(
            series = %series.label(),
            samples = series.samples.len(),
            "Inserting series"
        );

        self.send(self.post(INSERT_PATH).json(std::slice::from_ref(series)))
            .await?;
        Ok(())
    }
}
