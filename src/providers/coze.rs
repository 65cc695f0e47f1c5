use super::http::{HttpExecutor, OutboundRequest};
use crate::core::error::FetchError;
use crate::core::rewrite::DescriptionRewriter;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

const CONVERSATION_ID: &str = "123";
const INSTRUCTION: &str = "Can you rewrite the following text with a maximum of 50 words?";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat style rewrite backend talking to a Coze bot.
pub struct CozeRewriter {
    base_url: String,
    access_token: String,
    user_id: String,
    bot_id: String,
    executor: HttpExecutor,
}

impl CozeRewriter {
    pub fn new(
        base_url: &str,
        access_token: &str,
        user_id: &str,
        bot_id: &str,
        executor: HttpExecutor,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
            bot_id: bot_id.to_string(),
            executor,
        }
    }
}

#[async_trait]
impl DescriptionRewriter for CozeRewriter {
    #[instrument(name = "CozeRewrite", skip_all)]
    async fn rewrite(&self, text: &str) -> Result<String, FetchError> {
        let body = json!({
            "conversation_id": CONVERSATION_ID,
            "bot_id": self.bot_id,
            "user": self.user_id,
            "query": format!("{text}\n{INSTRUCTION}"),
            "stream": false,
        });
        let request = OutboundRequest::post(format!("{}/open_api/v2/chat", self.base_url), body)
            .bearer(&self.access_token);

        let data = self.executor.execute(request).await?;
        let response: ChatResponse = serde_json::from_value(data)
            .map_err(|e| FetchError::malformed(format!("chat response: {e}")))?;

        response
            .messages
            .into_iter()
            .next()
            .map(|m| m.content)
            .ok_or_else(|| FetchError::malformed("chat response has no messages"))
    }
}
