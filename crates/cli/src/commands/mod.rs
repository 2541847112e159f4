pub mod chat;
pub mod config;
pub mod doctor;
pub mod migrate;

use serde::Serialize;
use serde_json::Value;

/// What a command hands back to `main`: the process exit code and the text
/// printed on stdout.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// JSON body for non-interactive commands.
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: Value,
}

impl CommandResult {
    pub fn exit(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }

    pub fn ok_json(command: &str, message: impl Into<String>, details: Value) -> Self {
        let outcome = Outcome {
            command,
            status: "ok",
            error_class: None,
            message: message.into(),
            details,
        };
        Self::exit(0, render(&outcome))
    }

    pub fn error_json(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let outcome = Outcome {
            command,
            status: "error",
            error_class: Some(error_class),
            message: message.into(),
            details: Value::Null,
        };
        Self::exit(exit_code, render(&outcome))
    }
}

fn render(outcome: &Outcome<'_>) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|error| {
        serde_json::json!({
            "command": outcome.command,
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}
