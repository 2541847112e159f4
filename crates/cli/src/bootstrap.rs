use std::sync::Arc;

use intake_agent::{ChatCompletionsClient, LlmError, ResponsePhraser, SessionRuntime};
use intake_core::config::AppConfig;
use intake_db::{connect_with_settings, migrations, DbPool, SqlOrderRepository};
use thiserror::Error;
use tracing::info;

pub struct ChatApplication {
    pub db_pool: DbPool,
    pub runtime: SessionRuntime,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("generation client setup failed: {0}")]
    LlmClient(#[source] LlmError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl BootstrapError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::LlmClient(_) => "config_validation",
            Self::DatabaseConnect(_) => "db_connectivity",
            Self::Migration(_) => "migration",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::LlmClient(_) => 2,
            Self::DatabaseConnect(_) => 4,
            Self::Migration(_) => 5,
        }
    }
}

/// Connects the store, applies migrations and wires the session runtime.
pub async fn bootstrap(config: &AppConfig) -> Result<ChatApplication, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting chat bootstrap");

    let client = ChatCompletionsClient::new(&config.llm).map_err(BootstrapError::LlmClient)?;
    info!(
        event_name = "system.bootstrap.llm_client_ready",
        endpoint = client.endpoint(),
        model = %config.llm.model,
        "generation client configured"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    let report = migrations::apply(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        applied_now = report.applied_now.len(),
        already_applied = report.already_applied.len(),
        "database migrations applied"
    );

    let phraser = ResponsePhraser::new(Arc::new(client), &config.llm);
    let repository = Arc::new(SqlOrderRepository::new(db_pool.clone()));
    let runtime = SessionRuntime::new(phraser, repository);

    Ok(ChatApplication { db_pool, runtime })
}

#[cfg(test)]
mod tests {
    use intake_core::config::AppConfig;

    use super::{bootstrap, BootstrapError};

    fn config_with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test".to_string().into());
        config.database.url = "sqlite::memory:".to_string();
        config
    }

    #[tokio::test]
    async fn bootstrap_migrates_in_memory_store() {
        let app = bootstrap(&config_with_key()).await.expect("bootstrap succeeds");
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'orders'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("query sqlite_master");
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn bootstrap_without_api_key_is_a_configuration_failure() {
        let mut config = config_with_key();
        config.llm.api_key = None;

        let error = bootstrap(&config).await.err().expect("bootstrap must fail");
        assert!(matches!(error, BootstrapError::LlmClient(_)));
        assert_eq!(error.exit_code(), 2);
    }

    #[tokio::test]
    async fn unreachable_database_maps_to_connectivity_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_key();
        config.database.url =
            format!("sqlite://{}", dir.path().join("missing").join("orders.db").display());

        let error = bootstrap(&config).await.err().expect("bootstrap must fail");
        assert_eq!(error.error_class(), "db_connectivity");
        assert_eq!(error.exit_code(), 4);
    }
}
