use thiserror::Error;

use crate::config::ConfigError;
use crate::knowledge::KnowledgeError;

/// Failures that stop the engine from being assembled at startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("llm client could not be built: {0}")]
    LlmClient(String),
}

impl BootstrapError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Knowledge(_) => "knowledge",
            Self::LlmClient(_) => "llm",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration is invalid. Run `edubot config` to inspect it.",
            Self::Knowledge(_) => {
                "The knowledge base could not be loaded. Check knowledge.path and its contents."
            }
            Self::LlmClient(_) => "The completion client could not be started. Check the llm section.",
        }
    }
}
