pub mod coze;
pub mod fmp;
pub mod http;
pub mod openai;

use crate::core::config::AppConfig;
use crate::core::rewrite::{DescriptionRewriter, RewriteBackend};
use http::HttpExecutor;

/// Builds the rewriter for the backend chosen at config load.
pub fn build_rewriter(
    backend: RewriteBackend,
    config: &AppConfig,
    executor: HttpExecutor,
) -> Box<dyn DescriptionRewriter> {
    match backend {
        RewriteBackend::Coze => Box::new(coze::CozeRewriter::new(
            config.coze_url(),
            &config.access_token,
            &config.user_id,
            &config.bot_id,
            executor,
        )),
        RewriteBackend::OpenAi => Box::new(openai::OpenAiRewriter::new(
            config.openai_url(),
            config.openai_api_key(),
            executor,
        )),
    }
}
