pub mod gemini;
pub mod models;

use gemini::GeminiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;
use models::ImagePayload;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("Rate Limited")]
    RateLimited,
    #[error("Model returned no text")]
    EmptyResponse,
}

/// A hosted model that can answer a question about one image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Sends the instruction, the image and the question as one request and
    /// waits for the full text reply.
    async fn answer(
        &self,
        instruction: &str,
        image: &ImagePayload,
        question: &str,
    ) -> Result<String, LlmError>;
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn VisionProvider>> {
        match config.llm.provider.as_str() {
            "gemini" => {
                let cfg = &config.llm.gemini;
                Some(Arc::new(GeminiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.model.clone(),
                    Duration::from_secs(cfg.request_timeout_secs),
                )))
            }
            _ => None,
        }
    }
}
