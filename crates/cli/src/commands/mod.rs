pub mod chat;
pub mod config;
pub mod doctor;

use edubot_core::errors::BootstrapError;
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_KNOWLEDGE: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;
pub const EXIT_DOCTOR: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn bootstrap_failure(command: &str, error: &BootstrapError) -> Self {
        let exit_code = match error {
            BootstrapError::Config(_) => EXIT_CONFIG,
            BootstrapError::Knowledge(_) => EXIT_KNOWLEDGE,
            BootstrapError::LlmClient(_) => EXIT_RUNTIME,
        };
        Self::failure(command, error.error_class(), error.to_string(), exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
