//! Startup helpers for the chat relay server.

use std::process::ExitCode;

use crate::config::{ConfigError, RelayConfig};
use crate::server::{self, AppState};

/// Run the relay until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting chat relay v{}", env!("CARGO_PKG_VERSION"));

    match serve() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

fn serve() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = load_config().map_err(|e| format!("Invalid configuration: {e}"))?;
    tracing::info!(
        "Completion endpoint: {} (model {}, {} messages per conversation)",
        config.base_url,
        config.model,
        config.max_messages
    );

    let state =
        AppState::from_config(&config).map_err(|e| format!("Failed to create state: {e}"))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create runtime: {e}"))?;

    rt.block_on(server::run_server_with_shutdown(
        state,
        config.port,
        server::ctrl_c_signal(),
    ))
    .map_err(|e| format!("Server error: {e}"))?;

    Ok(())
}

/// Load and validate configuration from the environment.
///
/// # Errors
/// Returns an error if a variable is malformed or a value is out of range.
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    let config = RelayConfig::from_env()?;
    config.validate()?;
    Ok(config)
}
