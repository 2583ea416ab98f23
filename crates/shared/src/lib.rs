mod error;

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

pub use crate::error::{AppError, AppResult};

static TRACING_GUARD: OnceLock<()> = OnceLock::new();

/// Initialise global tracing subscriber with sensible defaults.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() -> AppResult<()> {
    if TRACING_GUARD.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| AppError::Message(format!("failed to initialise tracing: {err}")))?;
    let _ = TRACING_GUARD.set(());
    Ok(())
}
