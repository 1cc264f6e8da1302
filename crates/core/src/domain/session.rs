use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::program::Program;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId(pub String);

impl SenderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse progress marker through a conversation.
///
/// `Conversation` is a declared stage that no intent rule currently transitions into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    New,
    Greeting,
    TopicSelected,
    Conversation,
}

impl ConversationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Greeting => "greeting",
            Self::TopicSelected => "topic_selected",
            Self::Conversation => "conversation",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub sender_id: SenderId,
    pub display_name: String,
    pub current_topic: Option<Program>,
    pub stage: ConversationStage,
    pub message_count: u64,
    pub last_question: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(sender_id: SenderId, display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            sender_id,
            display_name: display_name.into(),
            current_topic: None,
            stage: ConversationStage::New,
            message_count: 0,
            last_question: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the populated fields of `patch` and refreshes `updated_at`.
    ///
    /// A patch never clears `current_topic`, and a lower `message_count` is ignored.
    pub fn apply(&mut self, patch: SessionPatch, now: DateTime<Utc>) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(topic) = patch.current_topic {
            self.current_topic = Some(topic);
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(message_count) = patch.message_count {
            self.message_count = self.message_count.max(message_count);
        }
        if let Some(last_question) = patch.last_question {
            self.last_question = last_question;
        }
        self.updated_at = now;
    }
}

/// Partial update for a [`Session`]; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub display_name: Option<String>,
    pub current_topic: Option<Program>,
    pub stage: Option<ConversationStage>,
    pub message_count: Option<u64>,
    pub last_question: Option<Option<String>>,
}

impl SessionPatch {
    pub fn with_stage(mut self, stage: ConversationStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_topic(mut self, topic: Program) -> Self {
        self.current_topic = Some(topic);
        self
    }
}
