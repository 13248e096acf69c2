//! # Global Logger Module
//!
//! An explicit, opt-in process-wide logger. Nothing is constructed at
//! import time: the application installs a logger once at startup and
//! either threads it through explicitly or reaches for [`get`] where
//! plumbing a handle is impractical. First install wins; later calls
//! are ignored, which keeps repeated initialization safe.

use crate::dispatch::Logger;
use crate::factory;
use once_cell::sync::OnceCell;

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Install the process-wide logger. Returns `Err` with the rejected
/// logger when one is already installed.
pub fn init(logger: Logger) -> Result<(), Logger> {
    GLOBAL_LOGGER.set(logger)
}

/// Install a default-configured logger for the detected runtime.
/// Safe to call more than once; only the first call installs.
pub fn init_default() {
    let _ = GLOBAL_LOGGER.set(factory::create_default());
}

/// The installed logger, if any.
pub fn get() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}
