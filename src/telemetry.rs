//! Structured logging setup.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Installs the global subscriber: JSON lines on stdout, at `level` and above.
pub fn init(level: Level) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
        .with(fmt::layer().json().with_writer(std::io::stdout))
        .try_init()
}
