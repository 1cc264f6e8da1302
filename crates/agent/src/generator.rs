use std::sync::Arc;
use std::time::Duration;

use edubot_core::domain::session::Session;
use edubot_core::format::ResponseFormatter;
use edubot_core::knowledge::KnowledgeBase;
use edubot_core::phrases::PhrasePicker;
use edubot_core::text::{contains_word, normalize_text};
use tracing::{info, warn};

use crate::llm::{CompletionError, LlmClient, SamplingParams};
use crate::prompt::build_messages;
use crate::replies;

const WELCOME_WORDS: [&str; 5] = ["hi", "hello", "hey", "namaste", "hola"];

/// Produces a reply for messages no deterministic rule handled. Never fails.
pub struct AiResponseGenerator {
    llm: Arc<dyn LlmClient>,
    knowledge: Arc<KnowledgeBase>,
    formatter: ResponseFormatter,
    picker: Arc<dyn PhrasePicker>,
    sampling: SamplingParams,
    timeout: Duration,
}

impl AiResponseGenerator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        knowledge: Arc<KnowledgeBase>,
        picker: Arc<dyn PhrasePicker>,
        sampling: SamplingParams,
        timeout: Duration,
    ) -> Self {
        let formatter = ResponseFormatter::new(picker.clone());
        Self { llm, knowledge, formatter, picker, sampling, timeout }
    }

    pub async fn generate(&self, user_message: &str, recipient_name: &str, session: &Session) -> String {
        let normalized = normalize_text(user_message);
        if WELCOME_WORDS.iter().any(|word| contains_word(&normalized, word)) {
            return replies::assistant_welcome(&self.knowledge, recipient_name);
        }

        match self.complete(user_message, recipient_name, session).await {
            Ok(completion) => self.formatter.format(&completion, recipient_name),
            Err(error) => {
                warn!(
                    event_name = "generator.completion.failed",
                    identity = %session.sender_id,
                    error_class = error.error_class(),
                    error = %error,
                    "completion failed; serving fallback"
                );
                self.fallback(recipient_name)
            }
        }
    }

    async fn complete(
        &self,
        user_message: &str,
        recipient_name: &str,
        session: &Session,
    ) -> Result<String, CompletionError> {
        let messages =
            build_messages(&self.knowledge, recipient_name, user_message, session.current_topic);

        let completion =
            tokio::time::timeout(self.timeout, self.llm.complete(&messages, &self.sampling))
                .await
                .map_err(|_| CompletionError::Timeout { after_secs: self.timeout.as_secs() })??;

        let completion = completion.trim();
        if completion.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(completion.to_string())
    }

    fn fallback(&self, recipient_name: &str) -> String {
        let mut options = replies::fallbacks(&self.knowledge, recipient_name);
        let index = self.picker.pick_index(options.len()).min(options.len() - 1);
        info!(event_name = "generator.completion.fallback", variant = index, "fallback reply selected");
        std::mem::take(&mut options[index])
    }
}
