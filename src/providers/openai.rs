use super::http::{HttpExecutor, OutboundRequest};
use crate::core::error::FetchError;
use crate::core::rewrite::DescriptionRewriter;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

const MAX_TOKENS: u32 = 50;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Completion style rewrite backend.
pub struct OpenAiRewriter {
    base_url: String,
    api_key: String,
    executor: HttpExecutor,
}

impl OpenAiRewriter {
    pub fn new(base_url: &str, api_key: &str, executor: HttpExecutor) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            executor,
        }
    }

    fn prompt(text: &str) -> String {
        format!("Rewrite the following text in a maximum of {MAX_TOKENS} words:\n{text}")
    }
}

#[async_trait]
impl DescriptionRewriter for OpenAiRewriter {
    #[instrument(name = "OpenAiRewrite", skip_all)]
    async fn rewrite(&self, text: &str) -> Result<String, FetchError> {
        let body = json!({
            "prompt": Self::prompt(text),
            "max_tokens": MAX_TOKENS,
        });
        let request = OutboundRequest::post(
            format!("{}/v1/engines/davinci-codex/completions", self.base_url),
            body,
        )
        .bearer(&self.api_key);

        let data = self.executor.execute(request).await?;
        let response: CompletionResponse = serde_json::from_value(data)
            .map_err(|e| FetchError::malformed(format!("completion response: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| FetchError::malformed("completion response has no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rewriter(base_url: &str) -> OpenAiRewriter {
        let executor = HttpExecutor::new(Duration::from_secs(5)).unwrap();
        OpenAiRewriter::new(base_url, "openai-key", executor)
    }

    #[tokio::test]
    async fn test_rewrite_trims_completion_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/engines/davinci-codex/completions"))
            .and(header("Authorization", "Bearer openai-key"))
            .and(body_json(json!({
                "prompt": "Rewrite the following text in a maximum of 50 words:\nAcme Corp makes widgets.",
                "max_tokens": 50,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"text": "  Acme makes widgets.  ", "index": 0}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = rewriter(&mock_server.uri())
            .rewrite("Acme Corp makes widgets.")
            .await
            .unwrap();

        assert_eq!(text, "Acme makes widgets.");
    }

    #[tokio::test]
    async fn test_rewrite_missing_choices_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "The model does not exist"}
            })))
            .mount(&mock_server)
            .await;

        let err = rewriter(&mock_server.uri())
            .rewrite("Acme Corp makes widgets.")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_rewrite_unauthorized_is_non_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let err = rewriter(&mock_server.uri())
            .rewrite("Acme Corp makes widgets.")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NonSuccessStatus { .. }));
    }
}
