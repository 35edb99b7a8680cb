//! A self-contained logger instance.

use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use crate::{
    config::{FilterMode, LoggerConfig, Threshold},
    formatter::{render_plain, render_structured, CallerLocation, OutputFormat, Record},
    level::Severity,
    sink::Sink,
    LoggerError,
};

/// A logger with its own configuration and output destination.
///
/// The free functions at the crate root log through a process-wide `Logger`; a separately
/// constructed instance is useful where shared state is undesirable, such as in tests.
///
/// Lines are written to stdout, colored by severity, unless a log file is configured, in which
/// case they are appended to that file without colors and flushed after every line. Failures
/// never propagate out of the logging methods: they are recorded and can be retrieved with
/// [`take_last_error`][Self::take_last_error].
///
/// # Example
///
/// ```
/// use leveled_log::{Logger, LoggerConfig};
///
/// let logger = Logger::new(LoggerConfig::default().with_app_name("worker").with_level(1));
///
/// logger.info("queue", "picked up job 42");
/// logger.debug_json("queue", "job 42 payload decoded");
/// ```
#[derive(Debug)]
pub struct Logger {
    app_name: String,
    threshold: Threshold,
    filter_mode: FilterMode,
    file_backed: bool,
    sink: Mutex<Sink>,
    last_error: Mutex<Option<LoggerError>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::from_parts(LoggerConfig::default(), Sink::stdout())
    }
}

impl Logger {
    /// Creates a logger, falling back to stdout if the configured log file cannot be opened.
    ///
    /// The fallback happens without a warning. The reason is kept for
    /// [`take_last_error`][Self::take_last_error] and emitted as a `tracing` event at `DEBUG`
    /// level only.
    pub fn new(config: LoggerConfig) -> Self {
        match Sink::for_config(&config) {
            Ok(sink) => Self::from_parts(config, sink),
            Err(error) => {
                report_fallback(&error);
                let logger = Self::from_parts(config, Sink::stdout());
                logger.record_error(error);
                logger
            }
        }
    }

    /// Creates a logger, failing if the configured log file cannot be opened.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::CreateDirectory`] or [`LoggerError::OpenFile`] if the log file or
    /// its parent directory cannot be created.
    pub fn try_new(config: LoggerConfig) -> Result<Self, LoggerError> {
        let sink = Sink::for_config(&config)?;
        Ok(Self::from_parts(config, sink))
    }

    pub(crate) fn from_parts(config: LoggerConfig, sink: Sink) -> Self {
        let mut logger = Self {
            app_name: String::new(),
            threshold: Threshold::default(),
            filter_mode: FilterMode::default(),
            file_backed: !sink.is_colored(),
            sink: Mutex::new(sink),
            last_error: Mutex::new(None),
        };
        logger.apply_settings(config);
        logger
    }

    /// Takes over the name, threshold and filter mode of `config`, leaving the sink untouched.
    pub(crate) fn apply_settings(&mut self, config: LoggerConfig) {
        self.threshold = config.threshold();
        self.app_name = config.app_name;
        self.filter_mode = config.filter_mode;
    }

    /// Sends console output to `writer` instead of stdout.
    ///
    /// Has no effect on a logger that writes to a file.
    #[must_use]
    pub fn with_console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        let sink = self.sink.get_mut().unwrap_or_else(PoisonError::into_inner);
        if sink.is_colored() {
            *sink = Sink::Console(Box::new(writer));
        }
        self
    }

    /// Name of the program included in every line.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The validated severity threshold.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// How the threshold is applied.
    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Whether lines go to a log file rather than the console.
    pub fn is_file_backed(&self) -> bool {
        self.file_backed
    }

    /// Whether a call of the given severity would be written.
    pub fn enabled(&self, severity: Severity) -> bool {
        self.threshold.permits(severity, self.filter_mode)
    }

    /// Logs a plain line with [`Severity::Debug`].
    #[track_caller]
    pub fn debug(&self, category: &str, text: &str) {
        self.log(Severity::Debug, OutputFormat::Plain, category, text);
    }

    /// Logs a plain line with [`Severity::Info`].
    #[track_caller]
    pub fn info(&self, category: &str, text: &str) {
        self.log(Severity::Info, OutputFormat::Plain, category, text);
    }

    /// Logs a plain line with [`Severity::Warning`].
    #[track_caller]
    pub fn warning(&self, category: &str, text: &str) {
        self.log(Severity::Warning, OutputFormat::Plain, category, text);
    }

    /// Logs a plain line with [`Severity::Error`].
    #[track_caller]
    pub fn error(&self, category: &str, text: &str) {
        self.log(Severity::Error, OutputFormat::Plain, category, text);
    }

    /// Logs a plain line with [`Severity::Critical`].
    #[track_caller]
    pub fn critical(&self, category: &str, text: &str) {
        self.log(Severity::Critical, OutputFormat::Plain, category, text);
    }

    /// Logs a structured line with [`Severity::Debug`].
    #[track_caller]
    pub fn debug_json(&self, category: &str, text: &str) {
        self.log(Severity::Debug, OutputFormat::Structured, category, text);
    }

    /// Logs a structured line with [`Severity::Info`].
    #[track_caller]
    pub fn info_json(&self, category: &str, text: &str) {
        self.log(Severity::Info, OutputFormat::Structured, category, text);
    }

    /// Logs a structured line with [`Severity::Warning`].
    #[track_caller]
    pub fn warning_json(&self, category: &str, text: &str) {
        self.log(Severity::Warning, OutputFormat::Structured, category, text);
    }

    /// Logs a structured line with [`Severity::Error`].
    #[track_caller]
    pub fn error_json(&self, category: &str, text: &str) {
        self.log(Severity::Error, OutputFormat::Structured, category, text);
    }

    /// Logs a structured line with [`Severity::Critical`].
    #[track_caller]
    pub fn critical_json(&self, category: &str, text: &str) {
        self.log(Severity::Critical, OutputFormat::Structured, category, text);
    }

    /// Logs a line, attributing it to the caller of this method.
    #[track_caller]
    pub fn log(&self, severity: Severity, format: OutputFormat, category: &str, text: &str) {
        self.log_at(severity, format, category, text, CallerLocation::caller());
    }

    /// Logs a line, attributing it to an explicit source location.
    pub fn log_at(
        &self,
        severity: Severity,
        format: OutputFormat,
        category: &str,
        text: &str,
        location: CallerLocation,
    ) {
        if !self.enabled(severity) {
            return;
        }

        let record = Record::new(severity, category, text, location);
        let colored = !self.file_backed;
        let line = match format {
            OutputFormat::Plain => render_plain(&self.app_name, &record, colored),
            OutputFormat::Structured => render_structured(&self.app_name, &record, colored)
                .unwrap_or_else(|error| {
                    self.record_error(error);
                    String::new()
                }),
        };

        // Nothing on this path may emit `tracing` events: a forwarding layer would re-enter the
        // sink lock held below.
        let result = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_line(&line);
        if let Err(error) = result {
            self.record_error(LoggerError::Write(error));
        }
    }

    /// Flushes any buffered output.
    pub fn flush(&self) {
        let result = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
        if let Err(error) = result {
            self.record_error(LoggerError::Write(error));
        }
    }

    /// Returns and clears the most recent failure swallowed by this logger.
    pub fn take_last_error(&self) -> Option<LoggerError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn record_error(&self, error: LoggerError) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }
}

/// Fallback to the console is silent at the default `tracing` verbosity: the reason is only
/// emitted as a `DEBUG` event, for subscribers that opt into it.
pub(crate) fn report_fallback(error: &LoggerError) {
    tracing::debug!(%error, "failed to open log file, keeping the previous destination");
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use std::{
        fs,
        io,
        sync::{Arc, Mutex},
    };

    use serde_json::Value;

    use super::*;
    use crate::{keys, level::colors};

    /// Console writer that keeps everything written to it.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().expect("capture lock poisoned").clone();
            String::from_utf8(bytes)
                .expect("log output is not UTF-8")
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("capture lock poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console_logger(level: i64, filter_mode: FilterMode) -> (Logger, Captured) {
        let captured = Captured::default();
        let config = LoggerConfig::default()
            .with_level(level)
            .with_filter_mode(filter_mode);
        let logger = Logger::new(config).with_console_writer(captured.clone());
        (logger, captured)
    }

    fn emit(logger: &Logger, severity: Severity) {
        logger.log(severity, OutputFormat::Plain, "test", "message");
    }

    #[test]
    fn threshold_filters_every_combination() {
        for mode in [FilterMode::UpToThreshold, FilterMode::AtLeastThreshold] {
            for threshold in 0..=4 {
                for severity in Severity::ALL {
                    let (logger, captured) = console_logger(threshold, mode);
                    emit(&logger, severity);

                    let expected = match mode {
                        FilterMode::UpToThreshold => i64::from(severity.rank()) <= threshold,
                        FilterMode::AtLeastThreshold => i64::from(severity.rank()) >= threshold,
                    };
                    assert_eq!(
                        captured.lines().len(),
                        usize::from(expected),
                        "{severity} at threshold {threshold} with {mode:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn console_lines_are_colored() {
        let (logger, captured) = console_logger(4, FilterMode::UpToThreshold);
        for severity in Severity::ALL {
            emit(&logger, severity);
        }

        let lines = captured.lines();
        assert_eq!(lines.len(), Severity::ALL.len());
        for (line, severity) in lines.iter().zip(Severity::ALL) {
            assert!(line.starts_with(severity.color()), "{line:?}");
            assert!(line.ends_with(colors::RESET), "{line:?}");
            assert!(line.contains(&format!("[{severity}]")), "{line:?}");
        }
    }

    #[test]
    fn info_line_layout_on_console() {
        let captured = Captured::default();
        let logger = Logger::new(LoggerConfig::default().with_level(1))
            .with_console_writer(captured.clone());

        let line_number = line!() + 1;
        logger.info("db", "connected");

        let lines = captured.lines();
        let line = lines.first().expect("no line written");
        let expected_suffix = format!(
            "[db][logger.rs:{line_number}][INFO]  \u{25b6}  connected{}",
            colors::RESET
        );
        assert!(line.starts_with(&format!("{}[APP][", colors::GREEN)), "{line:?}");
        assert!(line.ends_with(&expected_suffix), "{line:?}");
    }

    #[test]
    fn literal_threshold_lets_debug_through_at_level_one() {
        let (logger, captured) = console_logger(1, FilterMode::UpToThreshold);
        logger.debug("db", "pool size 5");
        logger.warning("db", "slow query");
        assert_eq!(captured.lines().len(), 1);
        assert!(captured.lines()[0].contains("pool size 5"));
    }

    #[test]
    fn invalid_level_writes_every_severity() {
        for level in [-1, 5] {
            let captured = Captured::default();
            let logger = Logger::new(LoggerConfig::default().with_level(level))
                .with_console_writer(captured.clone());
            assert_eq!(logger.threshold().value(), 0);

            for severity in Severity::ALL {
                emit(&logger, severity);
            }
            assert_eq!(captured.lines().len(), Severity::ALL.len(), "level {level}");
        }
    }

    #[test]
    fn reports_distinct_call_sites() {
        let (logger, captured) = console_logger(4, FilterMode::UpToThreshold);

        let first = line!() + 1;
        logger.info_json("site", "first");
        let second = line!() + 1;
        logger.info_json("site", "second");

        let lines: Vec<Value> = captured
            .lines()
            .iter()
            .map(|line| {
                let json = line
                    .strip_prefix(Severity::Info.color())
                    .and_then(|line| line.strip_suffix(colors::RESET))
                    .expect("structured console line is not colored");
                serde_json::from_str(json).expect("invalid JSON")
            })
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][keys::FILE], "logger.rs");
        assert_eq!(lines[0][keys::LINE], first);
        assert_eq!(lines[1][keys::LINE], second);
    }

    #[track_caller]
    fn wrapped(logger: &Logger) {
        logger.error("wrapper", "through one wrapper");
    }

    #[track_caller]
    fn doubly_wrapped(logger: &Logger) {
        wrapped(logger);
    }

    #[test]
    fn track_caller_wrappers_report_their_caller() {
        let (logger, captured) = console_logger(4, FilterMode::UpToThreshold);

        let direct = line!() + 1;
        wrapped(&logger);
        let nested = line!() + 1;
        doubly_wrapped(&logger);

        let lines = captured.lines();
        assert!(lines[0].contains(&format!("[logger.rs:{direct}]")), "{:?}", lines[0]);
        assert!(lines[1].contains(&format!("[logger.rs:{nested}]")), "{:?}", lines[1]);
    }

    #[test]
    fn file_sink_writes_uncolored_lines() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("logs").join("app.log");
        let logger = Logger::try_new(
            LoggerConfig::default()
                .with_log_path(&path)
                .with_level(0),
        )
        .expect("failed to open log file");
        assert!(logger.is_file_backed());

        const LINES: usize = 10;
        for index in 0..LINES {
            let severity = Severity::ALL[index % Severity::ALL.len()];
            logger.log(severity, OutputFormat::Plain, "round-trip", &format!("line {index}"));
        }

        let contents = fs::read_to_string(&path).expect("failed to read log file");
        assert!(contents.ends_with('\n'));
        assert!(!contents.contains('\x1b'));

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), LINES);
        for (index, line) in lines.iter().enumerate() {
            assert!(line.starts_with("[APP]["), "{line:?}");
            assert!(line.ends_with(&format!("  \u{25b6}  line {index}")), "{line:?}");
        }
    }

    #[test]
    fn structured_file_lines_parse_back() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let path = dir.path().join("app.jsonl");
        let logger = Logger::try_new(
            LoggerConfig::default()
                .with_app_name("APP")
                .with_log_path(&path)
                .with_level(0),
        )
        .expect("failed to open log file");

        logger.critical_json("payments", "card \"declined\"");
        logger.warning_json("payments", "retrying");

        let contents = fs::read_to_string(&path).expect("failed to read log file");
        let records: Vec<Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("invalid JSON"))
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0][keys::APP_NAME], "APP");
        assert_eq!(records[0][keys::LC], "payments");
        assert_eq!(records[0][keys::TEXT], "card \"declined\"");
        assert_eq!(records[0][keys::LEVEL], "CRITICAL");
        assert_eq!(records[1][keys::LEVEL], "WARNING");
        for record in &records {
            let file = record[keys::FILE].as_str().expect("file is not a string");
            assert!(!file.contains('/') && !file.contains('\\'));
            assert!(record[keys::LINE].as_u64().is_some_and(|line| line >= 1));
        }
    }

    #[test]
    fn unopenable_file_falls_back_to_console() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "").expect("failed to create blocking file");
        let config = LoggerConfig::default()
            .with_log_path(blocker.join("app.log"))
            .with_level(0);

        assert!(matches!(
            Logger::try_new(config.clone()),
            Err(LoggerError::CreateDirectory { .. })
        ));

        let captured = Captured::default();
        let logger = Logger::new(config).with_console_writer(captured.clone());
        assert!(!logger.is_file_backed());
        assert!(matches!(
            logger.take_last_error(),
            Some(LoggerError::CreateDirectory { .. })
        ));
        assert!(logger.take_last_error().is_none());

        assert!(logger.enabled(Severity::Info));
        logger.info("fallback", "still visible");
        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[INFO]  \u{25b6}  still visible"), "{:?}", lines[0]);
    }

    #[test]
    fn write_failures_are_recorded() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let logger = Logger::default().with_console_writer(Broken);
        assert!(logger.enabled(Severity::Critical));
        logger.critical("sink", "lost");
        assert!(matches!(logger.take_last_error(), Some(LoggerError::Write(_))));
    }

    #[test]
    fn concurrent_lines_are_not_interleaved() {
        let (logger, captured) = console_logger(4, FilterMode::UpToThreshold);
        let logger = Arc::new(logger);

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for index in 0..50 {
                        logger.info("thread", &format!("{thread}-{index}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("logging thread panicked");
        }

        let lines = captured.lines();
        assert_eq!(lines.len(), 8 * 50);
        for line in &lines {
            assert!(line.starts_with(Severity::Info.color()), "{line:?}");
            assert!(line.ends_with(colors::RESET), "{line:?}");
        }
    }
}
