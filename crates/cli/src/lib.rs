pub mod commands;

use clap::{Parser, Subcommand};
use edubot_core::config::{LogFormat, LoggingConfig};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "edubot",
    about = "Edubot operator CLI",
    long_about = "Chat with the edubot dialogue engine locally, inspect configuration, and run readiness checks.",
    after_help = "Examples:\n  edubot chat --name Asha\n  edubot doctor --json\n  edubot config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run stdin lines through the dialogue engine and print replies (`/quit` ends)")]
    Chat {
        #[arg(long, default_value = "local-operator", help = "Sender identity for the session")]
        identity: String,
        #[arg(long, default_value = "there", help = "Display name used in replies")]
        name: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, knowledge base, and LLM credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { identity, name } => commands::chat::run(&identity, &name),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber on stderr so stdout stays clean for replies and reports.
pub fn init_logging(config: &LoggingConfig) {
    use tracing::Level;

    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (tests, embedding); keep the existing one.
    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
