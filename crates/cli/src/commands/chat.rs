use std::future::Future;

use intake_agent::{
    fallback_confirmation, SessionError, SessionRuntime, StdioTerminal, Terminal, GOODBYE,
};
use intake_core::config::{AppConfig, LoadOptions};
use tracing::{error, info, warn};

use crate::bootstrap::bootstrap;
use crate::commands::CommandResult;
use crate::logging;

pub fn exit_code_for(error: &SessionError) -> u8 {
    match error {
        SessionError::Terminal(_) => 6,
        SessionError::Persistence(_) => 7,
        SessionError::Domain(_) => 1,
    }
}

/// Runs one interactive session on stdin/stdout until it ends or an
/// interrupt or terminate signal arrives.
pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::exit(2, format!("configuration issue: {error}")),
    };
    logging::init(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::exit(3, format!("failed to initialize async runtime: {error}"));
        }
    };

    let result = runtime.block_on(async {
        let mut terminal = StdioTerminal::new();
        run_until(&config, &mut terminal, shutdown_signal()).await
    });

    // The stdin reader thread may still be parked on a read.
    runtime.shutdown_background();
    result
}

/// Bootstraps the store and runs a session against `terminal`.
pub async fn run_session<T>(config: &AppConfig, terminal: &mut T) -> CommandResult
where
    T: Terminal + ?Sized,
{
    run_until(config, terminal, std::future::pending()).await
}

/// Same as `run_session`, but stops when `shutdown` resolves. Stopping is
/// always exit 0.
pub async fn run_until<T, F>(config: &AppConfig, terminal: &mut T, shutdown: F) -> CommandResult
where
    T: Terminal + ?Sized,
    F: Future<Output = &'static str>,
{
    tokio::pin!(shutdown);

    let app = tokio::select! {
        app = bootstrap(config) => match app {
            Ok(app) => app,
            Err(error) => {
                error!(
                    event_name = "cli.chat.bootstrap_failed",
                    error_class = error.error_class(),
                    error = %error,
                    "chat bootstrap failed"
                );
                return CommandResult::exit(error.exit_code(), error.to_string());
            }
        },
        signal = &mut shutdown => {
            info!(event_name = "cli.chat.interrupted", signal, "cancelled during bootstrap");
            return CommandResult::exit(0, "");
        }
    };

    let result = drive_session(&app.runtime, terminal, shutdown).await;
    app.db_pool.close().await;
    result
}

/// Races `runtime.run` against `shutdown`.
///
/// A shutdown before the write leaves the store untouched and shows the
/// goodbye. A shutdown after the write shows the saved order with its id
/// instead, since `run` may still be phrasing the confirmation.
pub async fn drive_session<T, F>(
    runtime: &SessionRuntime,
    terminal: &mut T,
    shutdown: F,
) -> CommandResult
where
    T: Terminal + ?Sized,
    F: Future<Output = &'static str>,
{
    let saved = runtime.saved_order();
    let outcome = tokio::select! {
        result = runtime.run(terminal) => Ok(result),
        signal = shutdown => Err(signal),
    };

    match outcome {
        Ok(Ok(report)) => {
            info!(
                event_name = "cli.chat.completed",
                order_id = report.order_id.0,
                "chat session finished"
            );
            CommandResult::exit(0, "")
        }
        Ok(Err(error)) => {
            error!(
                event_name = "cli.chat.failed",
                error_class = error.error_class(),
                error = %error,
                "chat session failed"
            );
            CommandResult::exit(exit_code_for(&error), error.to_string())
        }
        Err(signal) => {
            let saved = saved.borrow().clone();
            let farewell = match saved {
                Some(saved) => {
                    info!(
                        event_name = "cli.chat.interrupted_after_save",
                        signal,
                        order_id = saved.order_id.0,
                        "session cancelled after the order was stored"
                    );
                    fallback_confirmation(&saved.order, saved.order_id)
                }
                None => {
                    info!(event_name = "cli.chat.interrupted", signal, "session cancelled by signal");
                    GOODBYE.to_string()
                }
            };
            if let Err(error) = terminal.display(&farewell).await {
                warn!(event_name = "cli.chat.farewell_failed", error = %error, "could not show farewell");
            }
            CommandResult::exit(0, "")
        }
    }
}

async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => "interrupt",
        _ = terminate => "terminate",
    }
}
