pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod faq;
pub mod format;
pub mod knowledge;
pub mod phrases;
pub mod store;
pub mod text;

pub use clock::{Clock, DayPeriod, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError, LlmConfig, LlmProvider, LoadOptions, LogFormat};
pub use domain::program::Program;
pub use domain::session::{ConversationStage, SenderId, Session, SessionPatch};
pub use errors::BootstrapError;
pub use faq::FaqMatcher;
pub use format::ResponseFormatter;
pub use knowledge::{FaqAnswer, KnowledgeBase, KnowledgeError};
pub use phrases::{FirstPhrasePicker, PhrasePicker, SeededPicker};
pub use store::{IdentityLocks, InMemorySessionStore, SessionError, SessionStore};
