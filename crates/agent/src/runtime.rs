use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edubot_core::clock::{Clock, DayPeriod, SystemClock};
use edubot_core::config::AppConfig;
use edubot_core::domain::session::{ConversationStage, SenderId, Session, SessionPatch};
use edubot_core::errors::BootstrapError;
use edubot_core::faq::FaqMatcher;
use edubot_core::format::FALLBACK_RECIPIENT;
use edubot_core::knowledge::KnowledgeBase;
use edubot_core::phrases::{PhrasePicker, SeededPicker};
use edubot_core::store::{IdentityLocks, InMemorySessionStore, SessionError, SessionStore};
use edubot_core::text::normalize_text;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::generator::AiResponseGenerator;
use crate::llm::{build_llm_client, LlmClient, SamplingParams};
use crate::replies::{self, FOLLOW_UPS};
use crate::rules::{classify, Intent, IntentRule};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("failed to deliver message to `{identity}`: {reason}")]
pub struct SendError {
    pub identity: SenderId,
    pub reason: String,
}

/// Outbound delivery seam (WhatsApp Cloud API, console, test recorder).
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, identity: &SenderId, text: &str) -> Result<(), SendError>;
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Send(#[from] SendError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub identity: SenderId,
    pub text: Option<String>,
    pub display_name: Option<String>,
}

impl InboundMessage {
    pub fn new(
        identity: impl Into<String>,
        text: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            identity: SenderId::new(identity),
            text: Some(text.into()),
            display_name: Some(display_name.into()),
        }
    }
}

/// What `handle` did with one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleOutcome {
    pub correlation_id: String,
    pub rule: IntentRule,
    pub replies: Vec<String>,
    pub session: Session,
}

/// The intent cascade router.
///
/// Holds a per-identity lock for the whole of [`ConversationEngine::handle`], so turns from
/// one sender never interleave while different senders proceed in parallel.
pub struct ConversationEngine {
    knowledge: Arc<KnowledgeBase>,
    faq: FaqMatcher,
    store: Arc<dyn SessionStore>,
    sender: Arc<dyn MessageSender>,
    generator: AiResponseGenerator,
    picker: Arc<dyn PhrasePicker>,
    clock: Arc<dyn Clock>,
    locks: IdentityLocks,
}

pub struct EngineParts {
    pub knowledge: Arc<KnowledgeBase>,
    pub store: Arc<dyn SessionStore>,
    pub sender: Arc<dyn MessageSender>,
    pub llm: Arc<dyn LlmClient>,
    pub picker: Arc<dyn PhrasePicker>,
    pub clock: Arc<dyn Clock>,
    pub sampling: SamplingParams,
    pub completion_timeout: Duration,
}

impl ConversationEngine {
    pub fn new(parts: EngineParts) -> Result<Self, BootstrapError> {
        let faq = FaqMatcher::from_knowledge(&parts.knowledge)?;
        let generator = AiResponseGenerator::new(
            parts.llm,
            parts.knowledge.clone(),
            parts.picker.clone(),
            parts.sampling,
            parts.completion_timeout,
        );

        Ok(Self {
            knowledge: parts.knowledge,
            faq,
            store: parts.store,
            sender: parts.sender,
            generator,
            picker: parts.picker,
            clock: parts.clock,
            locks: IdentityLocks::new(),
        })
    }

    /// Assembles an engine from loaded configuration with the in-memory session store.
    pub fn from_config(
        config: &AppConfig,
        sender: Arc<dyn MessageSender>,
    ) -> Result<Self, BootstrapError> {
        let knowledge = Arc::new(KnowledgeBase::load(config.knowledge.path.as_deref())?);
        let llm = build_llm_client(&config.llm)
            .map_err(|error| BootstrapError::LlmClient(error.to_string()))?;
        let picker: Arc<dyn PhrasePicker> = match config.engine.random_seed {
            Some(seed) => Arc::new(SeededPicker::new(seed)),
            None => Arc::new(SeededPicker::from_entropy()),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(InMemorySessionStore::new(
            Duration::from_secs(config.session.idle_ttl_secs),
            clock.clone(),
        ));

        Self::new(EngineParts {
            knowledge,
            store,
            sender,
            llm,
            picker,
            clock,
            sampling: SamplingParams::from(&config.llm),
            completion_timeout: Duration::from_secs(config.llm.timeout_secs),
        })
    }

    pub async fn handle(&self, message: InboundMessage) -> Result<HandleOutcome, EngineError> {
        let correlation_id = Uuid::new_v4().to_string();
        let identity = message.identity;
        let text = message.text.unwrap_or_default();
        let name = message
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_RECIPIENT.to_string());

        let _turn = self.locks.acquire(&identity).await;

        let session = self.store.get_or_create(&identity, &name).await;
        if session.message_count == 0 {
            // Sweep idle senders whenever the map grows.
            self.store.evict_expired().await;
        }
        let message_count = session.message_count + 1;
        let session = self
            .store
            .update(
                &identity,
                SessionPatch {
                    display_name: Some(name.clone()),
                    message_count: Some(message_count),
                    ..SessionPatch::default()
                },
            )
            .await?;

        info!(
            event_name = "ingress.message.received",
            correlation_id = %correlation_id,
            identity = %identity,
            message_count,
            "inbound message received"
        );

        let normalized = normalize_text(&text);
        let (rule, intent) = classify(&normalized, &self.faq);
        info!(
            event_name = "engine.rule.matched",
            correlation_id = %correlation_id,
            identity = %identity,
            rule = rule.name(),
            "intent rule matched"
        );

        let (reply, patch) = self.respond(intent, &text, &name, &session).await;
        let session = match patch {
            Some(patch) => self.store.update(&identity, patch).await?,
            None => session,
        };

        if let Err(error) = self.sender.send_text(&identity, &reply).await {
            warn!(
                event_name = "engine.reply.send_failed",
                correlation_id = %correlation_id,
                identity = %identity,
                error = %error,
                "reply could not be delivered"
            );
            return Err(error.into());
        }
        info!(
            event_name = "engine.reply.sent",
            correlation_id = %correlation_id,
            identity = %identity,
            chars = reply.chars().count(),
            "reply sent"
        );

        Ok(HandleOutcome { correlation_id, rule, replies: vec![reply], session })
    }

    async fn respond(
        &self,
        intent: Intent,
        text: &str,
        name: &str,
        session: &Session,
    ) -> (String, Option<SessionPatch>) {
        let knowledge = self.knowledge.as_ref();
        match intent {
            Intent::Greeting => {
                let period = DayPeriod::from_hour(self.clock.local_hour());
                (
                    replies::greeting(knowledge, name, period),
                    Some(SessionPatch::default().with_stage(ConversationStage::Greeting)),
                )
            }
            Intent::BotQuestion => (replies::bot_identity(knowledge, name), None),
            Intent::CourseInquiry => (replies::course_overview(knowledge), None),
            Intent::SelectTopic(program) => (
                replies::topic_selected(knowledge, program),
                Some(
                    SessionPatch::default()
                        .with_topic(program)
                        .with_stage(ConversationStage::TopicSelected),
                ),
            ),
            Intent::MenuReply(option) => match session.current_topic {
                Some(program) => (
                    replies::menu_answer(knowledge, program, option, name, self.follow_up()),
                    None,
                ),
                None => (replies::choose_program_first(name), None),
            },
            Intent::Faq(answer) => (replies::faq_answer(&answer.answer, self.follow_up()), None),
            Intent::AiFallback => (self.generator.generate(text, name, session).await, None),
        }
    }

    fn follow_up(&self) -> &'static str {
        let index = self.picker.pick_index(FOLLOW_UPS.len()).min(FOLLOW_UPS.len() - 1);
        FOLLOW_UPS[index]
    }
}
