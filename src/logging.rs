//! Logging setup on top of the `log` facade.
//!
//! The library only emits through `log` macros; the binary installs
//! `env_logger` with [`init_logger`]. `RUST_LOG` always wins over the
//! configured default level.

use crate::util::hex::pretty_hex;
use log::{info, log, log_enabled, Level};

/// Bytes per line in raw-frame dumps.
const DUMP_WIDTH: usize = 16;

/// Initializes `env_logger` with `default_level` unless `RUST_LOG` is set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs `message` at `level` followed by a hex dump of `raw`.
pub fn log_raw(level: Level, message: &str, raw: &[u8]) {
    if log_enabled!(level) {
        log!(level, "{message} ({} bytes)\n{}", raw.len(), pretty_hex(raw, DUMP_WIDTH));
    }
}

/// Logs a discarded frame or exchange at error level with its raw bytes.
pub fn log_rejected(message: &str, raw: &[u8]) {
    log_raw(Level::Error, message, raw);
}
