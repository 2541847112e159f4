use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use intake_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct Sources {
    file_path: Option<PathBuf>,
    file_doc: Option<Value>,
    overrides: ConfigOverrides,
}

impl Sources {
    fn detect(options: &LoadOptions) -> Self {
        let file_path = resolve_config_path(options.config_path.as_deref());
        let file_doc = load_config_file_doc(file_path.as_deref());
        Self { file_path, file_doc, overrides: options.overrides.clone() }
    }

    fn line(&self, key_path: &str, value: &str, env_keys: &[&str]) -> String {
        render_line(key_path, value, self.field_source(key_path, env_keys))
    }

    fn field_source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(source) = self.override_source(key_path) {
            return source.to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }

    /// Global flags and programmatic overrides win over every other layer.
    fn override_source(&self, key_path: &str) -> Option<&'static str> {
        let overrides = &self.overrides;
        let (value, source) = match key_path {
            "database.url" => (&overrides.database_url, "flag (--database-url)"),
            "llm.model" => (&overrides.llm_model, "flag (--model)"),
            "logging.level" => (&overrides.log_level, "flag (--log-level)"),
            "llm.api_key" => (&overrides.llm_api_key, "override"),
            "llm.base_url" => (&overrides.llm_base_url, "override"),
            _ => return None,
        };
        value.as_ref().map(|_| source)
    }
}

/// Blank values are ignored by the loader, so they never count as a source.
fn env_is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

pub fn run(options: LoadOptions) -> String {
    let sources = Sources::detect(&options);
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let database = &config.database;
    let llm = &config.llm;
    let logging = &config.logging;

    let lines = vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
        sources.line("database.url", &database.url, &["INTAKE_DATABASE_URL"]),
        sources.line(
            "database.max_connections",
            &database.max_connections.to_string(),
            &["INTAKE_DATABASE_MAX_CONNECTIONS"],
        ),
        sources.line(
            "database.timeout_secs",
            &database.timeout_secs.to_string(),
            &["INTAKE_DATABASE_TIMEOUT_SECS"],
        ),
        sources.line(
            "llm.api_key",
            &redact_secret(llm.api_key.as_ref()),
            &["INTAKE_LLM_API_KEY", "OPENROUTER_API_KEY"],
        ),
        sources.line("llm.base_url", &llm.base_url, &["INTAKE_LLM_BASE_URL"]),
        sources.line("llm.model", &llm.model, &["INTAKE_LLM_MODEL", "OPENROUTER_MODEL"]),
        sources.line(
            "llm.timeout_secs",
            &llm.timeout_secs.to_string(),
            &["INTAKE_LLM_TIMEOUT_SECS"],
        ),
        sources.line(
            "llm.temperature",
            &llm.temperature.to_string(),
            &["INTAKE_LLM_TEMPERATURE"],
        ),
        sources.line(
            "llm.question_max_tokens",
            &llm.question_max_tokens.to_string(),
            &["INTAKE_LLM_QUESTION_MAX_TOKENS"],
        ),
        sources.line(
            "llm.confirmation_max_tokens",
            &llm.confirmation_max_tokens.to_string(),
            &["INTAKE_LLM_CONFIRMATION_MAX_TOKENS"],
        ),
        sources.line("llm.app_title", &llm.app_title, &[]),
        sources.line("llm.referer", llm.referer.as_deref().unwrap_or("<unset>"), &[]),
        sources.line(
            "logging.level",
            &logging.level,
            &["INTAKE_LOGGING_LEVEL", "INTAKE_LOG_LEVEL"],
        ),
        sources.line(
            "logging.format",
            &format!("{:?}", logging.format).to_ascii_lowercase(),
            &["INTAKE_LOGGING_FORMAT", "INTAKE_LOG_FORMAT"],
        ),
    ];

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
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

/// Keeps the provider prefix of keys like `sk-or-v1-...` and hides the rest.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
