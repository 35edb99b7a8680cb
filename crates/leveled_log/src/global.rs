//! The process-wide logger behind the crate-level logging functions.
//!
//! Configure it once, early, with [`configure`]; every call site can then log without holding a
//! handle. Reconfiguring later is safe, but lines logged concurrently with the swap may go to
//! either the old or the new destination.

use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    config::LoggerConfig,
    formatter::{CallerLocation, OutputFormat},
    level::Severity,
    logger::{report_fallback, Logger},
    sink::Sink,
    LoggerError,
};

static GLOBAL_LOGGER: LazyLock<RwLock<Logger>> = LazyLock::new(|| RwLock::new(Logger::default()));

fn read() -> RwLockReadGuard<'static, Logger> {
    GLOBAL_LOGGER.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Logger> {
    GLOBAL_LOGGER.write().unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the configuration of the process-wide logger.
///
/// Never fails: if the configured log file cannot be opened, the name, level and filter mode are
/// still applied but lines keep going wherever they went before (stdout, on first
/// configuration). No warning is printed; the reason is available from [`take_last_error`], and
/// is also emitted as a `tracing` event at `DEBUG` level for subscribers that enable it.
///
/// # Example
///
/// ```
/// leveled_log::configure(leveled_log::LoggerConfig::default().with_app_name("APP").with_level(1));
///
/// leveled_log::info("db", "connected");
/// ```
pub fn configure(config: LoggerConfig) {
    // The sink is opened, and any fallback reported, outside of the lock so that a `tracing`
    // layer forwarding to this logger cannot deadlock.
    match Sink::for_config(&config) {
        Ok(sink) => *write() = Logger::from_parts(config, sink),
        Err(error) => {
            report_fallback(&error);
            let mut logger = write();
            logger.apply_settings(config);
            logger.record_error(error);
        }
    }
}

/// Replaces the process-wide logger, reporting failure to open the log file.
///
/// # Errors
///
/// Returns [`LoggerError::CreateDirectory`] or [`LoggerError::OpenFile`] if the log file or its
/// parent directory cannot be created; the current configuration is then left unchanged.
pub fn try_configure(config: LoggerConfig) -> Result<(), LoggerError> {
    let logger = Logger::try_new(config)?;
    *write() = logger;
    Ok(())
}

/// Runs `f` with the process-wide logger.
///
/// `f` must not call [`configure`] or [`try_configure`], which would deadlock.
pub fn with_logger<R>(f: impl FnOnce(&Logger) -> R) -> R {
    f(&read())
}

/// Returns and clears the most recent failure swallowed by the process-wide logger.
pub fn take_last_error() -> Option<LoggerError> {
    read().take_last_error()
}

/// Flushes the process-wide logger.
pub fn flush() {
    read().flush();
}

/// Logs a line through the process-wide logger, attributing it to the caller.
#[track_caller]
pub fn log(severity: Severity, format: OutputFormat, category: &str, text: &str) {
    let location = CallerLocation::caller();
    read().log_at(severity, format, category, text, location);
}

/// Logs a plain line with [`Severity::Debug`].
#[track_caller]
pub fn debug(category: &str, text: &str) {
    log(Severity::Debug, OutputFormat::Plain, category, text);
}

/// Logs a plain line with [`Severity::Info`].
#[track_caller]
pub fn info(category: &str, text: &str) {
    log(Severity::Info, OutputFormat::Plain, category, text);
}

/// Logs a plain line with [`Severity::Warning`].
#[track_caller]
pub fn warning(category: &str, text: &str) {
    log(Severity::Warning, OutputFormat::Plain, category, text);
}

/// Logs a plain line with [`Severity::Error`].
#[track_caller]
pub fn error(category: &str, text: &str) {
    log(Severity::Error, OutputFormat::Plain, category, text);
}

/// Logs a plain line with [`Severity::Critical`].
#[track_caller]
pub fn critical(category: &str, text: &str) {
    log(Severity::Critical, OutputFormat::Plain, category, text);
}

/// Logs a structured line with [`Severity::Debug`].
#[track_caller]
pub fn debug_json(category: &str, text: &str) {
    log(Severity::Debug, OutputFormat::Structured, category, text);
}

/// Logs a structured line with [`Severity::Info`].
#[track_caller]
pub fn info_json(category: &str, text: &str) {
    log(Severity::Info, OutputFormat::Structured, category, text);
}

/// Logs a structured line with [`Severity::Warning`].
#[track_caller]
pub fn warning_json(category: &str, text: &str) {
    log(Severity::Warning, OutputFormat::Structured, category, text);
}

/// Logs a structured line with [`Severity::Error`].
#[track_caller]
pub fn error_json(category: &str, text: &str) {
    log(Severity::Error, OutputFormat::Structured, category, text);
}

/// Logs a structured line with [`Severity::Critical`].
#[track_caller]
pub fn critical_json(category: &str, text: &str) {
    log(Severity::Critical, OutputFormat::Structured, category, text);
}
