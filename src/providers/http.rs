use crate::core::error::FetchError;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A single outbound call. Built per request and dropped once it is sent.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

/// Executes outbound requests over one shared connection pool. One attempt per call.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fmpr/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Sends the request and parses a 200 response body as JSON.
    ///
    /// The body is ignored for GET requests.
    pub async fn execute(&self, request: OutboundRequest) -> Result<Value, FetchError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let safe_url = redact(&url);
        debug!(%method, url = %safe_url, "Sending request");

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if method != Method::GET
            && let Some(body) = &body
        {
            builder = builder.json(body);
        }

        // reqwest errors carry the full url, query string included
        let response = builder.send().await.map_err(|source| {
            let source = source.without_url();
            debug!(url = %safe_url, error = %source, "Request failed");
            FetchError::Transport {
                url: safe_url.clone(),
                source,
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = %safe_url, %status, "Non-success status");
            return Err(FetchError::NonSuccessStatus {
                url: safe_url,
                status,
            });
        }

        response.json::<Value>().await.map_err(|source| {
            let source = source.without_url();
            debug!(url = %safe_url, error = %source, "Failed to read response body");
            FetchError::Transport {
                url: safe_url.clone(),
                source,
            }
        })
    }
}

/// Strips the query string so API keys do not end up in error messages.
fn redact(url: &str) -> String {
    url.split_once('?')
        .map_or(url, |(base, _)| base)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor() -> HttpExecutor {
        HttpExecutor::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_parses_json_on_200() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"a": 1}])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/data?apikey=secret", mock_server.uri());
        let value = executor().execute(OutboundRequest::get(url)).await.unwrap();

        assert_eq!(value, json!([{"a": 1}]));
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("Authorization", "Bearer token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"query": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request =
            OutboundRequest::post(format!("{}/chat", mock_server.uri()), json!({"query": "hi"}))
                .bearer("token");
        let value = executor().execute(request).await.unwrap();

        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_non_200_is_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let url = format!("{}/data?apikey=secret", mock_server.uri());
        let err = executor()
            .execute(OutboundRequest::get(url))
            .await
            .unwrap_err();

        match err {
            FetchError::NonSuccessStatus { status, url } => {
                assert_eq!(status, StatusCode::CREATED);
                assert!(!url.contains("secret"));
            }
            other => panic!("Expected NonSuccessStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = executor()
            .execute(OutboundRequest::get(mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on port 9 locally
        let err = executor()
            .execute(OutboundRequest::get("http://127.0.0.1:9/profile"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let err = executor()
            .execute(OutboundRequest::get(
                "http://127.0.0.1:9/api/v3/profile/A?apikey=SUPERSECRET",
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(!err.to_string().contains("SUPERSECRET"));
        assert!(!format!("{err:?}").contains("SUPERSECRET"));
        let source = std::error::Error::source(&err).expect("Transport error has a source");
        assert!(!source.to_string().contains("SUPERSECRET"));
    }

    #[tokio::test]
    async fn test_slow_response_times_out_as_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/slow?apikey=SUPERSECRET", mock_server.uri());
        let err = HttpExecutor::new(Duration::from_millis(100))
            .unwrap()
            .execute(OutboundRequest::get(url))
            .await
            .unwrap_err();

        match err {
            FetchError::Transport { url, source } => {
                assert!(source.is_timeout());
                assert!(!url.contains("SUPERSECRET"));
                assert!(!source.to_string().contains("SUPERSECRET"));
            }
            other => panic!("Expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_redact_strips_query() {
        assert_eq!(
            redact("https://example.com/api/v3/profile/AAPL?apikey=secret"),
            "https://example.com/api/v3/profile/AAPL"
        );
        assert_eq!(redact("https://example.com/x"), "https://example.com/x");
    }
}
