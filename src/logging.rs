//! Logger setup for hosts embedding the engine.
//!
//! The engine itself only emits through the [`log`] facade; this helper wires
//! up [`env_logger`] for hosts that have no logger of their own.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g.
/// `"shader_session=debug,warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit filter. Takes precedence over `RUST_LOG`.
    pub env_filter: Option<String>,
    /// ANSI colouring behaviour.
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Only the first call has any effect.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info`.
/// Per-frame messages are logged at `trace`, so `info` stays quiet while a
/// session renders.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        // Another logger may already be installed by the host or a test
        // harness; that one wins.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
