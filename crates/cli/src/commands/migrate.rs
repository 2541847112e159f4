use intake_core::config::{AppConfig, LoadOptions};
use intake_db::{connect_with_settings, migrations, OrderRepository, SqlOrderRepository};
use serde_json::json;
use tracing::info;

use crate::commands::CommandResult;

const COMMAND: &str = "migrate";

/// Brings the orders store up to date and reports which versions this run
/// applied, which were already present and how many orders the store holds.
pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::error_json(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::error_json(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let database_url = config.database.url.clone();
    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &database_url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let report = migrations::apply(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let orders = SqlOrderRepository::new(pool.clone())
            .count()
            .await
            .map_err(|error| ("order_schema", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>((report, orders))
    });

    match result {
        Ok((report, orders)) => {
            info!(
                event_name = "cli.migrate.completed",
                applied_now = report.applied_now.len(),
                orders,
                "orders store migrated"
            );
            let message = if report.applied_now.is_empty() {
                format!("orders store at `{database_url}` was already up to date")
            } else {
                format!(
                    "applied {} migration(s) to `{database_url}`",
                    report.applied_now.len()
                )
            };
            CommandResult::ok_json(
                COMMAND,
                message,
                json!({
                    "database_url": database_url,
                    "applied_now": report.applied_now,
                    "already_applied": report.already_applied,
                    "orders": orders,
                }),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::error_json(COMMAND, error_class, message, exit_code)
        }
    }
}
