//! Logging setup
//!
//! Logs go to stderr so stdout stays free for bucket diagnostics and
//! summaries. `RUST_LOG` wins when set; otherwise the level comes from the
//! config, which `SEPVAL_LOG` may override.

use crate::config::{LogConfig, LogFormat};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a level, scoped to this crate
pub fn directive(config: &LogConfig) -> String {
    format!("sepval={}", config.level)
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(config)));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry().with(filter).with(layer).try_init().is_ok()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
                    .is_ok()
            }
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false);
            tracing_subscriber::registry().with(filter).with(layer).try_init().is_ok()
        }
    }
}
