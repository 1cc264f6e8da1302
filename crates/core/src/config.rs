use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub knowledge: KnowledgeConfig,
    pub session: SessionConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
}

#[derive(Clone, Debug, Default)]
pub struct KnowledgeConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub idle_ttl_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub random_seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
    Disabled,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Disabled => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Groq | Self::OpenAi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub knowledge_path: Option<PathBuf>,
    pub random_seed: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::Groq,
                api_key: None,
                base_url: None,
                model: "llama-3.3-70b-versatile".to_string(),
                timeout_secs: 20,
                temperature: 0.7,
                max_tokens: 500,
                presence_penalty: 0.3,
            },
            knowledge: KnowledgeConfig::default(),
            session: SessionConfig { idle_ttl_secs: 86_400 },
            engine: EngineConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected groq|openai|ollama|disabled)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LlmConfig {
    /// Explicit `base_url`, or the provider's well-known endpoint.
    pub fn effective_base_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("edubot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
            if let Some(presence_penalty) = llm.presence_penalty {
                self.llm.presence_penalty = presence_penalty;
            }
        }

        if let Some(knowledge) = patch.knowledge {
            if let Some(path) = knowledge.path {
                self.knowledge.path = Some(path);
            }
        }

        if let Some(session) = patch.session {
            if let Some(idle_ttl_secs) = session.idle_ttl_secs {
                self.session.idle_ttl_secs = idle_ttl_secs;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(random_seed) = engine.random_seed {
                self.engine.random_seed = Some(random_seed);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("EDUBOT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        let api_key = read_env("EDUBOT_LLM_API_KEY").or_else(|| read_env("GROQ_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("EDUBOT_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("EDUBOT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("EDUBOT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("EDUBOT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("EDUBOT_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("EDUBOT_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("EDUBOT_LLM_MAX_TOKENS") {
            self.llm.max_tokens = parse_u32("EDUBOT_LLM_MAX_TOKENS", &value)?;
        }
        if let Some(value) = read_env("EDUBOT_LLM_PRESENCE_PENALTY") {
            self.llm.presence_penalty = parse_f32("EDUBOT_LLM_PRESENCE_PENALTY", &value)?;
        }

        if let Some(value) = read_env("EDUBOT_KNOWLEDGE_PATH") {
            self.knowledge.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("EDUBOT_SESSION_IDLE_TTL_SECS") {
            self.session.idle_ttl_secs = parse_u64("EDUBOT_SESSION_IDLE_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("EDUBOT_ENGINE_RANDOM_SEED") {
            self.engine.random_seed = Some(parse_u64("EDUBOT_ENGINE_RANDOM_SEED", &value)?);
        }

        let log_level = read_env("EDUBOT_LOGGING_LEVEL").or_else(|| read_env("EDUBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("EDUBOT_LOGGING_FORMAT").or_else(|| read_env("EDUBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(knowledge_path) = overrides.knowledge_path {
            self.knowledge.path = Some(knowledge_path);
        }
        if let Some(random_seed) = overrides.random_seed {
            self.engine.random_seed = Some(random_seed);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("edubot.toml"), PathBuf::from("config/edubot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }
    if !(-2.0..=2.0).contains(&llm.presence_penalty) {
        return Err(ConfigError::Validation(
            "llm.presence_penalty must be in range -2.0..=2.0".to_string(),
        ));
    }
    if llm.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_tokens must be greater than zero".to_string(),
        ));
    }
    if llm.provider != LlmProvider::Disabled && llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if llm.provider.requires_api_key() {
        let missing = llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "llm.api_key is required for groq/openai providers (set EDUBOT_LLM_API_KEY or GROQ_API_KEY, or use provider `disabled`)"
                    .to_string(),
            ));
        }
    }

    if let Some(base_url) = &llm.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.idle_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "session.idle_ttl_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    knowledge: Option<KnowledgePatch>,
    session: Option<SessionPatch>,
    engine: Option<EnginePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    presence_penalty: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgePatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    idle_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    random_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
