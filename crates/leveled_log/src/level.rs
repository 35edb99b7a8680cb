//! Severity levels and the console color assigned to each of them.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// ANSI escape sequences used to colorize console output.
pub mod colors {
    /// White foreground.
    pub const WHITE: &str = "\x1b[37m";
    /// Green foreground.
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow foreground.
    pub const YELLOW: &str = "\x1b[33m";
    /// Red foreground.
    pub const RED: &str = "\x1b[31m";
    /// Bold red foreground.
    pub const BOLD_RED: &str = "\x1b[31;1m";
    /// Resets all attributes.
    pub const RESET: &str = "\x1b[0m";
}

/// The severity of a log record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Severity {
    /// Diagnostic output used while debugging code.
    Debug,

    /// Informational messages about the normal flow of the program.
    Info,

    /// Something unexpected happened, but the program can continue.
    Warning,

    /// An operation failed.
    Error,

    /// A failure the program is not expected to recover from.
    Critical,
}

impl Severity {
    /// All severities, in ascending rank order.
    pub const ALL: [Self; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// The numeric rank of the severity: `DEBUG` is `0`, `CRITICAL` is `4`.
    pub fn rank(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::Critical => 4,
        }
    }

    /// The upper-case name that appears in rendered log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// The escape sequence that starts a console line of this severity.
    pub fn color(self) -> &'static str {
        match self {
            Self::Debug => colors::WHITE,
            Self::Info => colors::GREEN,
            Self::Warning => colors::YELLOW,
            Self::Error => colors::RED,
            Self::Critical => colors::BOLD_RED,
        }
    }
}

/// Looks up the console color for a severity name.
///
/// Names that do not denote a [`Severity`] have no color, and an empty string is returned.
pub fn color_for_name(name: &str) -> &'static str {
    name.parse::<Severity>().map_or("", Severity::color)
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for &'static str {
    fn from(severity: Severity) -> Self {
        severity.as_str()
    }
}

/// Error returned when parsing an unknown severity name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity `{0}`")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSeverityError(s.to_owned()))
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warning,
            tracing::Level::ERROR => Self::Error,
        }
    }
}
