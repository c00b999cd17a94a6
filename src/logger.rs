//! logger.rs - tagged log helpers over the `log` facade.
//!
//! On firmware the backend is installed by `uefi::helpers::init()` and
//! writes to the UEFI console; on a host (tests) the calls are no-ops
//! unless a logger is installed.

pub fn log_debug(tag: &str, msg: &str) {
    log::debug!("[{tag}] {msg}");
}

pub fn log_info(tag: &str, msg: &str) {
    log::info!("[{tag}] {msg}");
}

pub fn log_warn(tag: &str, msg: &str) {
    log::warn!("[{tag}] {msg}");
}

/// Unrecoverable-path reporting; still just a log line, the caller decides
/// how control leaves the loader.
pub fn log_critical(tag: &str, msg: &str) {
    log::error!("[{tag}] CRITICAL: {msg}");
}
