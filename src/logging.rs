//! Logger setup for the binary.
//!
//! Library code only uses the `log` macros; the binary picks the sink. The
//! filter comes from `PHOTO_INGEST_LOG` when set (same syntax as `RUST_LOG`,
//! e.g. `PHOTO_INGEST_LOG=photo_ingest::metadata=debug`), otherwise `info`,
//! or `debug` with `--verbose`.

use crate::imaging::heic;
use log::{info, warn};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PHOTO_INGEST_LOG";

/// Default filter when [`LOG_ENV`] is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global logger. Safe to call more than once; later calls are
/// ignored.
pub fn init_logger(verbose: bool) {
    let env = env_logger::Env::new().filter_or(LOG_ENV, default_filter(verbose));
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}

/// Log startup facts worth knowing before a run: which optional decoders are
/// missing.
pub fn log_capabilities() {
    if heic::AVAILABLE {
        info!("HEIC/HEIF support enabled");
    } else {
        warn!("HEIC/HEIF support not available; .heic/.heif files will fail to decode");
        warn!("Rebuild with `--features heic` (requires libheif) to convert them");
    }
}
