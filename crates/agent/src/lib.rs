//! Dialogue engine for the edubot WhatsApp career advisor.
//!
//! An inbound message flows through a fixed cascade of deterministic rules (`rules`) that
//! answer from the knowledge base (`replies`). Anything no rule claims goes to the
//! `generator`, which prompts an OpenAI-compatible model (`llm`, `prompt`) and always
//! returns a usable reply, falling back to contact details when the model fails.
//!
//! # Key Types
//!
//! - `ConversationEngine` - per-sender router and session bookkeeping (see `runtime`)
//! - `LlmClient` - pluggable completion seam for Groq/OpenAI/Ollama
//! - `MessageSender` - outbound delivery seam

pub mod generator;
pub mod llm;
pub mod prompt;
pub mod replies;
pub mod rules;
pub mod runtime;

pub use generator::AiResponseGenerator;
pub use llm::{
    build_llm_client, ChatCompletionsClient, CompletionError, DisabledLlmClient, LlmClient,
    PromptMessage, PromptRole, SamplingParams,
};
pub use rules::{Intent, IntentRule};
pub use runtime::{
    ConversationEngine, EngineError, EngineParts, HandleOutcome, InboundMessage, MessageSender,
    SendError,
};
