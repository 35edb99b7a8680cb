//! Logger configuration and severity threshold handling.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::level::Severity;

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "APP";

/// Configuration for a [`Logger`][crate::Logger] or for the process-wide logger.
///
/// # Example
///
/// ```
/// use leveled_log::{FilterMode, LoggerConfig};
///
/// let config = LoggerConfig::default()
///     .with_app_name("billing")
///     .with_log_path("logs/billing.log")
///     .with_level(2)
///     .with_filter_mode(FilterMode::AtLeastThreshold);
///
/// assert_eq!(config.app_name, "billing");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Name of the program, included in every log line.
    pub app_name: String,

    /// File that log lines are appended to. If `None` or empty, lines are written to stdout.
    pub log_path: Option<PathBuf>,

    /// Numeric severity threshold: 0 - DEBUG, 1 - INFO, 2 - WARNING, 3 - ERROR, 4 - CRITICAL.
    /// Values outside this range are treated as `0`, the most verbose setting in the default
    /// [`FilterMode`].
    pub level: i64,

    /// How [`level`][Self::level] is compared against the rank of each call.
    pub filter_mode: FilterMode,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            log_path: None,
            level: 0,
            filter_mode: FilterMode::default(),
        }
    }
}

impl LoggerConfig {
    /// Sets the application name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the log file path. An empty path disables the file sink.
    #[must_use]
    pub fn with_log_path(mut self, log_path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(log_path.into());
        self
    }

    /// Sets the numeric severity threshold.
    #[must_use]
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }

    /// Sets the filter mode.
    #[must_use]
    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    /// The configured log file, ignoring empty paths.
    pub fn file_path(&self) -> Option<&Path> {
        self.log_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// The validated threshold.
    pub fn threshold(&self) -> Threshold {
        Threshold::clamped(self.level)
    }
}

/// Direction in which the threshold filters severities.
///
/// The two modes disagree on what raising the numeric level does. With the default,
/// [`AtLeastThreshold`][Self::AtLeastThreshold], a higher level only lets more severe calls
/// through, and level `0` (also the fallback for out-of-range levels) writes everything.
///
/// [`UpToThreshold`][Self::UpToThreshold] inverts this: a higher level makes the logger *more*
/// verbose, and level `0` writes only `DEBUG` lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// A call is emitted iff its rank is greater than or equal to the threshold.
    #[default]
    AtLeastThreshold,

    /// A call is emitted iff its rank is less than or equal to the threshold.
    UpToThreshold,
}

/// A severity threshold in the range `0..=4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u8);

impl Threshold {
    /// Builds a threshold from a raw level, mapping values outside `0..=4` to `0`.
    pub fn clamped(level: i64) -> Self {
        match u8::try_from(level) {
            Ok(level) if level <= Severity::Critical.rank() => Self(level),
            _ => Self(0),
        }
    }

    /// The numeric value of the threshold.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether a call of the given severity passes this threshold.
    pub fn permits(self, severity: Severity, mode: FilterMode) -> bool {
        match mode {
            FilterMode::UpToThreshold => severity.rank() <= self.0,
            FilterMode::AtLeastThreshold => severity.rank() >= self.0,
        }
    }
}

impl From<Severity> for Threshold {
    fn from(severity: Severity) -> Self {
        Self(severity.rank())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_levels_clamp_to_zero() {
        assert_eq!(Threshold::clamped(-1).value(), 0);
        assert_eq!(Threshold::clamped(5).value(), 0);
        assert_eq!(Threshold::clamped(i64::MAX).value(), 0);
        assert_eq!(Threshold::clamped(4).value(), 4);
        assert_eq!(LoggerConfig::default().with_level(-1).threshold().value(), 0);
    }

    #[test]
    fn up_to_threshold_permits_ranks_at_or_below() {
        for threshold in 0..=4 {
            for severity in Severity::ALL {
                let permitted =
                    Threshold::clamped(threshold).permits(severity, FilterMode::UpToThreshold);
                assert_eq!(
                    permitted,
                    i64::from(severity.rank()) <= threshold,
                    "{severity} at threshold {threshold}"
                );
            }
        }
    }

    #[test]
    fn at_least_threshold_permits_ranks_at_or_above() {
        for threshold in 0..=4 {
            for severity in Severity::ALL {
                let permitted =
                    Threshold::clamped(threshold).permits(severity, FilterMode::AtLeastThreshold);
                assert_eq!(
                    permitted,
                    i64::from(severity.rank()) >= threshold,
                    "{severity} at threshold {threshold}"
                );
            }
        }
    }

    #[test]
    fn empty_path_disables_file_sink() {
        let config = LoggerConfig::default().with_log_path("");
        assert!(config.file_path().is_none());

        let config = LoggerConfig::default().with_log_path("logs/app.log");
        assert_eq!(config.file_path(), Some(Path::new("logs/app.log")));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{ "app_name": "svc", "filter_mode": "up_to_threshold" }"#)
                .expect("failed to deserialize config");

        assert_eq!(config.app_name, "svc");
        assert_eq!(config.log_path, None);
        assert_eq!(config.level, 0);
        assert_eq!(config.filter_mode, FilterMode::UpToThreshold);
    }

    #[test]
    fn default_and_clamped_levels_permit_every_severity() {
        for config in [
            LoggerConfig::default(),
            LoggerConfig::default().with_level(-1),
            LoggerConfig::default().with_level(5),
        ] {
            assert_eq!(config.filter_mode, FilterMode::AtLeastThreshold);
            for severity in Severity::ALL {
                assert!(
                    config.threshold().permits(severity, config.filter_mode),
                    "{severity} at level {}",
                    config.level
                );
            }
        }
    }
}
