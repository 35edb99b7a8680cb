//! `leveled_log` writes leveled, category-tagged log lines to the console or to a log file.
//!
//! Every line carries the application name, a timestamp, a caller-supplied category, the source
//! location of the call and the severity:
//!
//! ```text
//! [APP][2024/03/09 - 17:05:42][db][pool.rs:42][INFO]  ▶  connected
//! ```
//!
//! It offers:
//! - Crate-level functions ([`debug`], [`info`], [`warning`], [`error`], [`critical`]) that log
//!   through a process-wide logger set up once with [`configure`].
//! - `_json` variants of each of them that write a single-line JSON object instead, see
//!   [`StructuredRecord`].
//! - A [`Logger`] type with the same methods, for code that prefers to own its logger.
//! - With the `layer` feature, a [`LoggerLayer`] that forwards [`tracing`] events to a logger.
//!
//! Console lines are colored by severity. When a log file is configured, lines are appended to
//! it without colors, and each line is flushed as soon as it is written.
//!
//! Logging never fails the caller. A log file that cannot be opened leaves output on the
//! console, and failed writes are dropped; the most recent such failure can be inspected with
//! [`take_last_error`], and [`try_configure`] reports setup failures directly.
//!
//! # Severity threshold
//!
//! The numeric `level` in [`LoggerConfig`] is compared against the rank of each severity
//! (`DEBUG` = 0 up to `CRITICAL` = 4). By default ([`FilterMode::AtLeastThreshold`]) a call is
//! written iff its rank is *at least* the level, so level `0`, which out-of-range levels fall
//! back to, writes everything. [`FilterMode::UpToThreshold`] selects the inverted rule, where a
//! call is written iff its rank is *at most* the level: raising the level then makes the logger
//! more verbose, and level `0` writes only `DEBUG` lines.
//!
//! ```
//! use leveled_log::{FilterMode, LoggerConfig};
//!
//! leveled_log::configure(LoggerConfig::default().with_app_name("APP").with_level(2));
//! leveled_log::warning("db", "replica lagging");
//! leveled_log::debug("db", "not written");
//!
//! leveled_log::configure(
//!     LoggerConfig::default()
//!         .with_app_name("APP")
//!         .with_level(1)
//!         .with_filter_mode(FilterMode::UpToThreshold),
//! );
//! leveled_log::debug("db", "pool size 5");
//! leveled_log::error("db", "not written");
//! ```

mod config;
mod formatter;
mod global;
#[cfg(feature = "layer")]
mod layer;
mod level;
mod logger;
mod sink;

use std::{io, path::PathBuf};

pub use self::{
    config::{FilterMode, LoggerConfig, Threshold, DEFAULT_APP_NAME},
    formatter::{
        render_plain, render_structured, timestamp, CallerLocation, OutputFormat, Record,
        StructuredRecord,
    },
    global::{
        configure, critical, critical_json, debug, debug_json, error, error_json, flush, info,
        info_json, log, take_last_error, try_configure, warning, warning_json, with_logger,
    },
    level::{color_for_name, colors, ParseSeverityError, Severity},
    logger::Logger,
};
#[cfg(feature = "layer")]
pub use self::layer::LoggerLayer;

/// Names of the fields of a structured log line.
pub mod keys {
    /// Name of the program.
    pub const APP_NAME: &str = "app_name";
    /// Timestamp of the call.
    pub const DTTM: &str = "dttm";
    /// Category tag.
    pub const LC: &str = "lc";
    /// Base name of the calling source file.
    pub const FILE: &str = "file";
    /// Line of the call.
    pub const LINE: &str = "line";
    /// Severity name.
    pub const LEVEL: &str = "level";
    /// Message body.
    pub const TEXT: &str = "text";

    #[cfg(feature = "layer")]
    pub(crate) const MESSAGE: &str = "message";
}

/// Errors that can occur within the logger.
///
/// The logging functions never return these; they are reported by [`try_configure`],
/// [`Logger::try_new`], and the last-error accessors.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The directory that should contain the log file could not be created.
    #[error("Failed to create log directory `{path}`: {source}")]
    CreateDirectory {
        /// The directory.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The log file could not be opened.
    #[error("Failed to open log file `{path}`: {source}")]
    OpenFile {
        /// The log file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A line could not be written to the sink.
    #[error("Failed to write log line: {0}")]
    Write(#[source] io::Error),

    /// A structured line could not be serialized.
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
