pub mod bootstrap;
pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use intake_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "intake",
    about = "Restaurant order intake chatbot",
    long_about = "Collect a customer's name, phone, dish and comments over a terminal conversation and store the finished order.",
    after_help = "Examples:\n  intake\n  intake chat --model openai/gpt-4o-mini\n  intake doctor --json\n  intake config"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "URL", help = "Override database.url")]
    database_url: Option<String>,
    #[arg(long, global = true, value_name = "MODEL", help = "Override llm.model")]
    model: Option<String>,
    #[arg(long, global = true, value_name = "LEVEL", help = "Override logging.level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one order intake conversation (default)")]
    Chat,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, generation service readiness, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                database_url: self.database_url.clone(),
                log_level: self.log_level.clone(),
                llm_model: self.model.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let result = commands::chat::run(options);
            if !result.output.is_empty() {
                eprintln!("{}", result.output);
            }
            return ExitCode::from(result.exit_code);
        }
        Command::Migrate => commands::migrate::run(options),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(options) }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn chat_is_the_default_command() {
        let cli = Cli::try_parse_from(["intake"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(!cli.load_options().require_file);
    }

    #[test]
    fn global_overrides_feed_load_options() {
        let cli = Cli::try_parse_from([
            "intake",
            "doctor",
            "--json",
            "--config",
            "custom.toml",
            "--model",
            "openai/gpt-4o-mini",
        ])
        .expect("parses");

        assert!(matches!(cli.command, Some(Command::Doctor { json: true })));
        let options = cli.load_options();
        assert!(options.require_file);
        assert_eq!(options.overrides.llm_model.as_deref(), Some("openai/gpt-4o-mini"));
        assert!(options.overrides.llm_api_key.is_none());
    }
}
