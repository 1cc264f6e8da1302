use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edubot_agent::{
    CompletionError, ConversationEngine, EngineParts, InboundMessage, IntentRule, LlmClient,
    MessageSender, PromptMessage, SamplingParams, SendError,
};
use edubot_core::clock::{Clock, FixedClock};
use edubot_core::domain::program::Program;
use edubot_core::domain::session::{ConversationStage, SenderId};
use edubot_core::format::ResponseFormatter;
use edubot_core::knowledge::KnowledgeBase;
use edubot_core::phrases::FirstPhrasePicker;
use edubot_core::store::{InMemorySessionStore, SessionStore};
use tokio::sync::Mutex;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(SenderId, String)>>,
}

impl RecordingSender {
    async fn texts_for(&self, identity: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(sender, _)| sender.as_str() == identity)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, identity: &SenderId, text: &str) -> Result<(), SendError> {
        self.sent.lock().await.push((identity.clone(), text.to_string()));
        Ok(())
    }
}

struct ScriptedLlm {
    reply: Result<String, CompletionError>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(text.to_string()), calls: AtomicUsize::new(0) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(CompletionError::Transport("connection reset".to_string())),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        _messages: &[PromptMessage],
        _sampling: &SamplingParams,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

struct SteppingClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    fn new() -> Self {
        Self { now: std::sync::Mutex::new(Utc::now()) }
    }

    fn advance(&self, seconds: i64) {
        *self.now.lock().expect("clock lock") += chrono::Duration::seconds(seconds);
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }

    fn local_hour(&self) -> u32 {
        9
    }
}

struct Harness {
    engine: Arc<ConversationEngine>,
    sender: Arc<RecordingSender>,
    store: Arc<InMemorySessionStore>,
    llm: Arc<ScriptedLlm>,
}

fn harness_with(llm: Arc<ScriptedLlm>, hour: u32) -> Harness {
    let clock = Arc::new(FixedClock::at_hour(hour));
    let sender = Arc::new(RecordingSender::default());
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600), clock.clone()));
    let engine = ConversationEngine::new(EngineParts {
        knowledge: Arc::new(KnowledgeBase::builtin()),
        store: store.clone(),
        sender: sender.clone(),
        llm: llm.clone(),
        picker: Arc::new(FirstPhrasePicker),
        clock,
        sampling: SamplingParams::default(),
        completion_timeout: Duration::from_secs(5),
    })
    .expect("engine builds from builtin knowledge");

    Harness { engine: Arc::new(engine), sender, store, llm }
}

fn harness() -> Harness {
    harness_with(ScriptedLlm::replying("Python is covered from the basics."), 9)
}

#[tokio::test]
async fn greeting_on_fresh_identity_names_user_and_both_programs() {
    let harness = harness();
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900001", "Hi!", "Asha"))
        .await
        .expect("greeting handled");

    assert_eq!(outcome.rule, IntentRule::Greeting);
    let reply = &outcome.replies[0];
    assert!(reply.starts_with("Good morning Asha!"));
    assert!(reply.contains("Agentic AI"));
    assert!(reply.contains("Data Analytics"));
    assert_eq!(outcome.session.stage, ConversationStage::Greeting);
    assert_eq!(outcome.session.current_topic, None);
    assert_eq!(harness.sender.texts_for("447700900001").await, vec![reply.clone()]);
}

#[tokio::test]
async fn menu_digit_without_topic_prompts_for_program() {
    let harness = harness();
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900002", "3", "Ravi"))
        .await
        .expect("digit handled");

    assert_eq!(outcome.rule, IntentRule::MenuReply);
    assert!(outcome.replies[0].contains("First, choose a program"));
    assert_eq!(outcome.session.current_topic, None);
}

#[tokio::test]
async fn ai_selects_agentic_program_with_six_item_menu() {
    let harness = harness();
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900003", "AI", "Asha"))
        .await
        .expect("topic handled");

    assert_eq!(outcome.session.current_topic, Some(Program::AgenticAi));
    assert_eq!(outcome.session.stage, ConversationStage::TopicSelected);

    let keycaps = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣"];
    let menu_items = outcome.replies[0]
        .lines()
        .filter(|line| keycaps.iter().any(|keycap| line.starts_with(keycap)))
        .count();
    assert_eq!(menu_items, 6);
}

#[tokio::test]
async fn greeting_outranks_fee_keyword() {
    let harness = harness();
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900004", "hello, what about fees?", "Asha"))
        .await
        .expect("greeting handled");

    assert_eq!(outcome.rule, IntentRule::Greeting);
    assert!(!outcome.replies[0].contains("Fees & Payment"));
}

#[tokio::test]
async fn greeting_wins_when_punctuation_has_no_space() {
    let harness = harness();
    for (index, text) in ["hello,what about fees?", "Hi,fees?", "hey!fees"].iter().enumerate() {
        let outcome = harness
            .engine
            .handle(InboundMessage::new(format!("44770090002{index}"), *text, "Asha"))
            .await
            .expect("greeting handled");
        assert_eq!(outcome.rule, IntentRule::Greeting, "input: {text}");
        assert!(!outcome.replies[0].contains("Fees & Payment"));
    }
}

#[tokio::test]
async fn completion_failure_yields_contact_fallback() {
    let harness = harness_with(ScriptedLlm::failing(), 14);
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900005", "Can I study on weekends only?", "Asha"))
        .await
        .expect("fallback handled");

    assert_eq!(outcome.rule, IntentRule::AiFallback);
    assert_eq!(harness.llm.calls.load(Ordering::SeqCst), 1);
    assert!(!outcome.replies[0].trim().is_empty());
    assert!(outcome.replies[0].contains("support@edtechinformative.uk"));
}

#[tokio::test]
async fn successful_completion_is_formatted() {
    let harness = harness();
    let outcome = harness
        .engine
        .handle(InboundMessage::new("447700900006", "Is Python hard to learn?", "Asha"))
        .await
        .expect("completion handled");

    assert_eq!(outcome.replies[0], "Hi Asha! 😊 Python is covered from the basics. Does this help?");
}

#[test]
fn formatter_personalizes_and_closes() {
    let formatter = ResponseFormatter::new(Arc::new(FirstPhrasePicker));
    let formatted = formatter.format("Sure, here are the details.", "Asha");
    assert!(formatted.contains("Asha"));
    assert!(
        formatted.ends_with('?') || formatted.ends_with('!') || formatted.ends_with('😊'),
        "unexpected ending: {formatted}"
    );
}

#[tokio::test]
async fn message_count_tracks_every_turn() {
    let harness = harness();
    let identity = SenderId::new("447700900007");
    let script = ["hi", "AI", "1", "fees", "what about weekends", "d", "6"];

    for (index, text) in script.iter().enumerate() {
        let outcome = harness
            .engine
            .handle(InboundMessage::new(identity.as_str(), *text, "Asha"))
            .await
            .expect("turn handled");
        assert_eq!(outcome.session.message_count, index as u64 + 1);
    }

    let session = harness.store.get_or_create(&identity, "Asha").await;
    assert_eq!(session.message_count, script.len() as u64);
    assert_eq!(session.current_topic, Some(Program::DataAnalytics));
}

#[tokio::test]
async fn topic_persists_through_non_topic_turns() {
    let harness = harness();
    let engine = &harness.engine;
    engine.handle(InboundMessage::new("447700900008", "data", "Ravi")).await.expect("topic");
    engine.handle(InboundMessage::new("447700900008", "hello", "Ravi")).await.expect("greet");
    let outcome =
        engine.handle(InboundMessage::new("447700900008", "2", "Ravi")).await.expect("menu");

    assert_eq!(outcome.session.current_topic, Some(Program::DataAnalytics));
    assert_eq!(outcome.session.stage, ConversationStage::Greeting);
    assert!(outcome.replies[0].contains("Eligibility for Data Analytics"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_from_one_sender_are_serialized() {
    let harness = harness();
    let mut tasks = Vec::new();
    for index in 0..20 {
        let engine = harness.engine.clone();
        let identity = if index % 2 == 0 { "447700900010" } else { "447700900011" };
        tasks.push(tokio::spawn(async move {
            engine.handle(InboundMessage::new(identity, "fees", "Asha")).await
        }));
    }

    let mut counts: HashMap<String, Vec<u64>> = HashMap::new();
    for task in tasks {
        let outcome = task.await.expect("task joins").expect("turn handled");
        counts
            .entry(outcome.session.sender_id.as_str().to_string())
            .or_default()
            .push(outcome.session.message_count);
    }

    for (_, mut seen) in counts {
        seen.sort_unstable();
        assert_eq!(seen, (1..=10).collect::<Vec<u64>>());
    }
}

#[tokio::test]
async fn idle_senders_are_dropped_when_a_new_sender_arrives() {
    let clock = Arc::new(SteppingClock::new());
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(10), clock.clone()));
    let engine = ConversationEngine::new(EngineParts {
        knowledge: Arc::new(KnowledgeBase::builtin()),
        store: store.clone(),
        sender: Arc::new(RecordingSender::default()),
        llm: ScriptedLlm::replying("unused"),
        picker: Arc::new(FirstPhrasePicker),
        clock: clock.clone(),
        sampling: SamplingParams::default(),
        completion_timeout: Duration::from_secs(5),
    })
    .expect("engine builds from builtin knowledge");

    for index in 0..100 {
        engine
            .handle(InboundMessage::new(format!("4477009{index:05}"), "fees", "Asha"))
            .await
            .expect("turn handled");
    }
    assert_eq!(store.len().await, 100);

    clock.advance(3600);
    engine.handle(InboundMessage::new("447700999999", "fees", "Ravi")).await.expect("new sender");

    assert_eq!(store.len().await, 1);
    assert!(store.get(&SenderId::new("447700999999")).await.is_some());
}
