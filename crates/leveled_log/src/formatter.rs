//! Rendering of log records into plain or structured (JSON) lines.

use std::{ffi::OsStr, fmt, panic::Location, path::Path};

use serde::Serialize;
use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::{
    level::{colors, Severity},
    LoggerError,
};

/// Format of the timestamp in every log line, e.g. `2024/03/09 - 17:05:42`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] - [hour]:[minute]:[second]");

/// Marker placed between the record header and the message text of a plain line.
const TEXT_SEPARATOR: &str = "  \u{25b6}  ";

/// Output shape of a log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `[app][timestamp][category][file:line][LEVEL]  ▶  text`
    #[default]
    Plain,

    /// A single-line JSON object, see [`StructuredRecord`].
    Structured,
}

/// Source location of the call that produced a log record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallerLocation {
    file: &'static str,
    line: u32,
}

impl CallerLocation {
    /// Builds a location from a source path and line, keeping only the base name of the path.
    pub fn new(path: &'static str, line: u32) -> Self {
        let file = Path::new(path)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(path);

        Self { file, line }
    }

    /// The location of the caller of the function this is invoked from.
    ///
    /// Every function between the public logging API and this call is `#[track_caller]`, so the
    /// location reported is the first frame outside of this crate no matter how many wrappers
    /// the call passes through.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }

    /// Base name of the source file.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line number within the source file.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for CallerLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Returns the current wall-clock time formatted for a log line.
///
/// Local time is used when the local UTC offset can be determined, and UTC otherwise.
pub fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(TIMESTAMP_FORMAT).unwrap_or_default()
}

/// A single log call, captured before rendering.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    /// Severity of the call.
    pub severity: Severity,

    /// Caller-supplied category tag.
    pub category: &'a str,

    /// Message body.
    pub text: &'a str,

    /// Time of the call, already formatted.
    pub timestamp: String,

    /// Where the call was made from.
    pub location: CallerLocation,
}

impl<'a> Record<'a> {
    /// Captures a record, stamping it with the current time.
    pub fn new(
        severity: Severity,
        category: &'a str,
        text: &'a str,
        location: CallerLocation,
    ) -> Self {
        Self {
            severity,
            category,
            text,
            timestamp: timestamp(),
            location,
        }
    }
}

/// JSON shape of a structured log line.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StructuredRecord<'a> {
    /// Name of the program.
    pub app_name: &'a str,

    /// Timestamp, in the same format as plain lines.
    pub dttm: &'a str,

    /// Category tag.
    pub lc: &'a str,

    /// Base name of the calling source file.
    pub file: &'a str,

    /// Line of the call.
    pub line: u32,

    /// Severity name.
    pub level: Severity,

    /// Message body.
    pub text: &'a str,
}

impl<'a> StructuredRecord<'a> {
    /// Borrows the fields of a record.
    pub fn new(app_name: &'a str, record: &'a Record<'_>) -> Self {
        Self {
            app_name,
            dttm: &record.timestamp,
            lc: record.category,
            file: record.location.file(),
            line: record.location.line(),
            level: record.severity,
            text: record.text,
        }
    }
}

/// Renders a record as a plain line, wrapped in the severity color if `colored` is set.
///
/// The text is written as is: a newline inside it is not escaped, so the record spans several
/// physical lines and only the first one carries the header. Use [`render_structured`] when
/// every record must stay on a single line.
pub fn render_plain(app_name: &str, record: &Record<'_>, colored: bool) -> String {
    let line = format!(
        "[{app_name}][{}][{}][{}][{}]{TEXT_SEPARATOR}{}",
        record.timestamp, record.category, record.location, record.severity, record.text
    );

    if colored {
        paint(record.severity, &line)
    } else {
        line
    }
}

/// Renders a record as a compact JSON object, wrapped in the severity color if `colored` is set.
///
/// # Errors
///
/// Returns [`LoggerError::JsonSerialization`] if the record cannot be serialized.
pub fn render_structured(
    app_name: &str,
    record: &Record<'_>,
    colored: bool,
) -> Result<String, LoggerError> {
    let line = serde_json::to_string(&StructuredRecord::new(app_name, record))?;

    if colored {
        Ok(paint(record.severity, &line))
    } else {
        Ok(line)
    }
}

fn paint(severity: Severity, line: &str) -> String {
    format!("{}{line}{}", severity.color(), colors::RESET)
}
