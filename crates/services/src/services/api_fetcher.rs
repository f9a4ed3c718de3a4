//! HTTP transport port for outbound API calls.
//!
//! Every remote call goes through [`ApiFetcher`], keeping the services
//! decoupled from the concrete HTTP client and letting tests substitute
//! arbitrary transport outcomes.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Outcome classification for a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server responded with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },
    /// The request never produced a usable response.
    #[error("failed to reach {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A failure unrelated to the HTTP exchange; callers re-raise it as-is.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One outbound request, tagged with the owning subsystem and the caller's
/// correlation id.
#[derive(Debug)]
pub struct FetchRequest {
    pub url: String,
    pub payload: FetchPayload,
    pub system: &'static str,
    pub request_id: String,
}

/// Method, headers and optional body for a [`FetchRequest`].
#[derive(Debug)]
pub struct FetchPayload {
    pub method: Method,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl FetchPayload {
    /// GET expecting a JSON body back.
    pub fn get_json() -> Self {
        Self {
            method: Method::GET,
            headers: vec![("accept", "application/json".to_string())],
            body: None,
        }
    }

    /// PUT carrying a JSON body, expecting JSON back.
    pub fn put_json(body: String) -> Self {
        Self {
            method: Method::PUT,
            headers: vec![
                ("accept", "application/json".to_string()),
                ("content-type", "application/json".to_string()),
            ],
            body: Some(body),
        }
    }
}

/// Response from a successful fetch (2xx status).
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: String,
}

impl FetchResponse {
    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[async_trait]
pub trait ApiFetcher: Send + Sync {
    /// Perform exactly one attempt; retry and timeout policy live with the
    /// implementation, not the callers.
    async fn fetch_data(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Default [`ApiFetcher`] backed by a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiFetcher for HttpFetcher {
    async fn fetch_data(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        tracing::debug!(
            system = request.system,
            request_id = %request.request_id,
            "{} {}",
            request.payload.method,
            request.url
        );

        let mut builder = self.client.request(request.payload.method, &request.url);
        for (name, value) in &request.payload.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.payload.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(source) => {
                return Err(FetchError::Connection {
                    url: request.url,
                    source,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(system = request.system, "{} answered {}", request.url, status);
            return Err(FetchError::Status {
                status,
                url: request.url,
                body,
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => {
                return Err(FetchError::Connection {
                    url: request.url,
                    source,
                });
            }
        };

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn get_json_sends_accept_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new();
        let response = fetcher
            .fetch_data(FetchRequest {
                url: format!("{}/ping", mock_server.uri()),
                payload: FetchPayload::get_json(),
                system: "test",
                request_id: "req-1".to_string(),
            })
            .await
            .expect("Should fetch successfully");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn put_json_sends_body_and_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/thing"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"name":"x"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new();
        let response = fetcher
            .fetch_data(FetchRequest {
                url: format!("{}/thing", mock_server.uri()),
                payload: FetchPayload::put_json(r#"{"name":"x"}"#.to_string()),
                system: "test",
                request_id: "req-2".to_string(),
            })
            .await
            .expect("Should send PUT body verbatim");

        assert_eq!(response.body, "{}");
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new();
        let error = fetcher
            .fetch_data(FetchRequest {
                url: format!("{}/broken", mock_server.uri()),
                payload: FetchPayload::get_json(),
                system: "test",
                request_id: "req-3".to_string(),
            })
            .await
            .expect_err("503 should not be a success");

        match error {
            FetchError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "unavailable");
            }
            other => panic!("Expected Status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_becomes_connection_error() {
        let fetcher = HttpFetcher::new();
        let error = fetcher
            .fetch_data(FetchRequest {
                url: "http://127.0.0.1:1/nope".to_string(),
                payload: FetchPayload::get_json(),
                system: "test",
                request_id: "req-4".to_string(),
            })
            .await
            .expect_err("Nothing listens on port 1");

        assert!(matches!(error, FetchError::Connection { .. }));
    }
}
