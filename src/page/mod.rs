pub mod models;

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::llm::VisionProvider;
use crate::session::SessionStore;
pub use models::{image_from_upload, PageError, PageInput, PageOutcome, PageView, UploadedImage};

/// Runs one request/response cycle of the chat page against a session.
#[derive(Clone)]
pub struct PageController {
    provider: Arc<dyn VisionProvider>,
    instruction: String,
    idle_timeout: Duration,
}

impl PageController {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        instruction: impl Into<String>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            instruction: instruction.into(),
            idle_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn VisionProvider>, config: &AppConfig) -> Self {
        Self::new(provider, config.chat.system_prompt.clone(), config.idle_timeout())
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub async fn run_cycle(
        &self,
        store: &SessionStore,
        session_id: Uuid,
        input: PageInput,
        now: DateTime<Utc>,
    ) -> PageOutcome {
        // Expiry runs before anything else reads the session
        if store.with_session(session_id, now, |s| s.maybe_expire(now, self.idle_timeout)) {
            info!(
                "Session {} idle for more than {}s, conversation cleared",
                session_id,
                self.idle_timeout.num_seconds()
            );
        }

        let error = if input.submit {
            self.submit(store, session_id, input, now).await.err()
        } else {
            None
        };

        let view = store.with_session(session_id, now, |s| PageView::from_session(s));
        PageOutcome::new(view, error)
    }

    async fn submit(
        &self,
        store: &SessionStore,
        session_id: Uuid,
        input: PageInput,
        now: DateTime<Utc>,
    ) -> Result<(), PageError> {
        let image = image_from_upload(input.image)?;
        store.with_session(session_id, now, |s| s.touch(now));

        // The store lock is released while the model is working
        let answer = self
            .provider
            .answer(&self.instruction, &image, &input.question)
            .await
            .map_err(|e| {
                error!("{} failed for session {}: {}", self.provider.name(), session_id, e);
                PageError::Upstream(e)
            })?;

        store.with_session(session_id, now, |s| s.record(input.question, answer));
        Ok(())
    }
}
