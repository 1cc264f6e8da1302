use std::sync::Arc;

use async_trait::async_trait;
use edubot_agent::{ConversationEngine, EngineError, InboundMessage, MessageSender, SendError};
use edubot_core::config::{AppConfig, LoadOptions};
use edubot_core::domain::session::SenderId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_RUNTIME};

pub const QUIT_COMMAND: &str = "/quit";

/// Delivers replies to the terminal, one block per reply.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSender;

#[async_trait]
impl MessageSender for StdoutSender {
    async fn send_text(&self, identity: &SenderId, text: &str) -> Result<(), SendError> {
        write_block(text)
            .await
            .map_err(|error| SendError { identity: identity.clone(), reason: error.to_string() })
    }
}

async fn write_block(text: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{text}\n\n").as_bytes()).await?;
    stdout.flush().await
}

pub fn run(identity: &str, name: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            );
        }
    };
    crate::init_logging(&config.logging);

    let engine = match ConversationEngine::from_config(&config, Arc::new(StdoutSender)) {
        Ok(engine) => engine,
        Err(error) => return CommandResult::bootstrap_failure("chat", &error),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let identity = SenderId::new(identity);
    let result = runtime.block_on(async {
        let stdin = BufReader::new(tokio::io::stdin());
        converse(&engine, stdin, &identity, name).await
    });

    match result {
        Ok(handled) => {
            tracing::info!(
                event_name = "system.cli.chat_finished",
                identity = %identity,
                handled,
                "chat session ended"
            );
            CommandResult::success("chat", format!("chat ended after {handled} message(s)"))
        }
        Err(error) => CommandResult::failure("chat", "engine", error.to_string(), EXIT_RUNTIME),
    }
}

/// Feeds each non-blank input line to the engine until EOF or `/quit`.
///
/// Returns how many messages were handled.
pub async fn converse<R>(
    engine: &ConversationEngine,
    input: R,
    identity: &SenderId,
    name: &str,
) -> Result<usize, EngineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0usize;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(
                    event_name = "system.cli.input_failed",
                    error = %error,
                    "stopped reading chat input"
                );
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == QUIT_COMMAND {
            break;
        }

        engine
            .handle(InboundMessage {
                identity: identity.clone(),
                text: Some(text.to_string()),
                display_name: Some(name.to_string()),
            })
            .await?;
        handled += 1;
    }

    Ok(handled)
}
