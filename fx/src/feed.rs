//! Transport for the daily PTAX feed.

use async_trait::async_trait;
use chrono::NaiveDate;
use ptax_common::format_date_for_url;
use std::time::Duration;
use thiserror::Error;

/// Address of the feed file for `date`: `{base}/{YYYYMMDD}.csv`.
pub fn feed_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}.csv",
        base_url.trim_end_matches('/'),
        format_date_for_url(date)
    )
}

/// Raw response from the feed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Fetches feed files as plain text.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Transport name, for logs.
    fn name(&self) -> &str;

    /// GET `url`, giving up after `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FeedResponse, TransportError>;
}

/// HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client sending `user_agent`; an agent that is not a valid
    /// header value is an error.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let user_agent = reqwest::header::HeaderValue::from_str(user_agent)
            .map_err(|e| TransportError::Client(format!("invalid user agent: {}", e)))?;
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedTransport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<FeedResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(timeout)
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        Ok(FeedResponse { status, body })
    }
}

/// Scripted response for one feed date.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with a status and body, optionally after a delay.
    Reply {
        status: u16,
        body: String,
        delay: Option<Duration>,
    },
    /// Fail at the transport level.
    Fail(String),
}

/// In-memory feed keyed by date. Unscripted dates answer 404.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockFeedTransport {
    responses: dashmap::DashMap<String, MockResponse>,
    calls: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockFeedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(date: NaiveDate) -> String {
        format!("{}.csv", format_date_for_url(date))
    }

    /// Serve `body` with status 200 for `date`.
    pub fn set_body(&self, date: NaiveDate, body: impl Into<String>) {
        self.set_response(
            date,
            MockResponse::Reply {
                status: 200,
                body: body.into(),
                delay: None,
            },
        );
    }

    /// Answer `date` with a bare status code.
    pub fn set_status(&self, date: NaiveDate, status: u16) {
        self.set_response(
            date,
            MockResponse::Reply {
                status,
                body: String::new(),
                delay: None,
            },
        );
    }

    /// Serve `body` for `date` only after `delay`.
    pub fn set_delayed(&self, date: NaiveDate, body: impl Into<String>, delay: Duration) {
        self.set_response(
            date,
            MockResponse::Reply {
                status: 200,
                body: body.into(),
                delay: Some(delay),
            },
        );
    }

    pub fn set_failure(&self, date: NaiveDate, message: impl Into<String>) {
        self.set_response(date, MockResponse::Fail(message.into()));
    }

    pub fn set_response(&self, date: NaiveDate, response: MockResponse) {
        self.responses.insert(Self::key(date), response);
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl FeedTransport for MockFeedTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self, url: &str, _timeout: Duration) -> Result<FeedResponse, TransportError> {
        self.calls.lock().push(url.to_string());

        let key = url.rsplit('/').next().unwrap_or_default();
        let response = self.responses.get(key).map(|r| r.clone());

        match response {
            Some(MockResponse::Reply {
                status,
                body,
                delay,
            }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(FeedResponse { status, body })
            }
            Some(MockResponse::Fail(message)) => Err(TransportError::Request(message)),
            None => Ok(FeedResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
