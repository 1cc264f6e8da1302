use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use edubot_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct Field<'a> {
    key_path: &'static str,
    value: String,
    env_keys: &'a [&'static str],
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    CommandResult { exit_code: 0, output: render(&config) }
}

pub fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let llm = &config.llm;
    let api_key = llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let fields = [
        Field {
            key_path: "llm.provider",
            value: format!("{:?}", llm.provider),
            env_keys: &["EDUBOT_LLM_PROVIDER"],
        },
        Field { key_path: "llm.model", value: llm.model.clone(), env_keys: &["EDUBOT_LLM_MODEL"] },
        Field {
            key_path: "llm.base_url",
            value: llm.effective_base_url().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["EDUBOT_LLM_BASE_URL"],
        },
        Field {
            key_path: "llm.api_key",
            value: api_key,
            env_keys: &["EDUBOT_LLM_API_KEY", "GROQ_API_KEY"],
        },
        Field {
            key_path: "llm.timeout_secs",
            value: llm.timeout_secs.to_string(),
            env_keys: &["EDUBOT_LLM_TIMEOUT_SECS"],
        },
        Field {
            key_path: "llm.temperature",
            value: llm.temperature.to_string(),
            env_keys: &["EDUBOT_LLM_TEMPERATURE"],
        },
        Field {
            key_path: "llm.max_tokens",
            value: llm.max_tokens.to_string(),
            env_keys: &["EDUBOT_LLM_MAX_TOKENS"],
        },
        Field {
            key_path: "llm.presence_penalty",
            value: llm.presence_penalty.to_string(),
            env_keys: &["EDUBOT_LLM_PRESENCE_PENALTY"],
        },
        Field {
            key_path: "knowledge.path",
            value: config
                .knowledge
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<builtin>".to_string()),
            env_keys: &["EDUBOT_KNOWLEDGE_PATH"],
        },
        Field {
            key_path: "session.idle_ttl_secs",
            value: config.session.idle_ttl_secs.to_string(),
            env_keys: &["EDUBOT_SESSION_IDLE_TTL_SECS"],
        },
        Field {
            key_path: "engine.random_seed",
            value: config
                .engine
                .random_seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "<entropy>".to_string()),
            env_keys: &["EDUBOT_ENGINE_RANDOM_SEED"],
        },
        Field {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["EDUBOT_LOGGING_LEVEL", "EDUBOT_LOG_LEVEL"],
        },
        Field {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["EDUBOT_LOGGING_FORMAT", "EDUBOT_LOG_FORMAT"],
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("edubot.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/edubot.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a provider prefix such as `gsk_` or `sk-` and hides the rest.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some(index) = trimmed.find(['-', '_']) {
        return format!("{}***", &trimmed[..=index]);
    }

    "<redacted>".to_string()
}
