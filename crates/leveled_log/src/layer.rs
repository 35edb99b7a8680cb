//! Provides a [`tracing_subscriber::Layer`] ([`LoggerLayer`]) that writes `tracing` events
//! through a [`Logger`].

use std::{fmt, sync::Arc};

use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use crate::{
    formatter::{CallerLocation, OutputFormat},
    global,
    keys,
    level::Severity,
    logger::Logger,
};

/// Logger that receives the forwarded events.
#[derive(Clone, Debug)]
enum Destination {
    Global,
    Instance(Arc<Logger>),
}

/// A [`tracing_subscriber::Layer`] that renders `tracing` events as log lines.
///
/// Each event becomes one line with:
/// - the event level mapped onto a [`Severity`] (`TRACE` is logged as `DEBUG`),
/// - the event target as the category,
/// - the `message` field as the text, followed by any other fields as `key=value` pairs,
/// - the file and line of the `tracing` macro invocation as the caller location.
///
/// # Example
///
/// ```
/// use leveled_log::LoggerLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let subscriber = tracing_subscriber::registry().with(LoggerLayer::global());
///
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(attempt = 3, "reconnected");
/// });
/// ```
#[derive(Clone, Debug)]
pub struct LoggerLayer {
    destination: Destination,
    format: OutputFormat,
}

impl LoggerLayer {
    /// Forwards events to the process-wide logger.
    pub fn global() -> Self {
        Self {
            destination: Destination::Global,
            format: OutputFormat::Plain,
        }
    }

    /// Forwards events to the given logger.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            destination: Destination::Instance(logger),
            format: OutputFormat::Plain,
        }
    }

    /// Writes structured lines instead of plain ones.
    #[must_use]
    pub fn structured(mut self) -> Self {
        self.format = OutputFormat::Structured;
        self
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = Severity::from(*metadata.level());
        let location = CallerLocation::new(
            metadata.file().unwrap_or("?"),
            metadata.line().unwrap_or_default(),
        );

        let mut text = EventText::default();
        event.record(&mut text);
        let text = text.render(metadata.target());

        let log = |logger: &Logger| {
            logger.log_at(severity, self.format, metadata.target(), &text, location);
        };
        match &self.destination {
            Destination::Global => global::with_logger(log),
            Destination::Instance(logger) => log(logger),
        }
    }
}

/// Collects the message and the remaining fields of an event.
#[derive(Debug, Default)]
struct EventText {
    message: Option<String>,
    fields: Vec<String>,
}

impl EventText {
    /// The message, or `fallback` if the event has none, followed by the other fields.
    fn render(self, fallback: &str) -> String {
        let mut text = self.message.unwrap_or_else(|| fallback.to_owned());
        for field in self.fields {
            text.push(' ');
            text.push_str(&field);
        }
        text
    }
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == keys::MESSAGE {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            keys::MESSAGE => {
                if self.message.is_none() {
                    self.message = Some(format!("{value:?}"));
                }
            }
            // Added by `tracing-log` for events bridged from the `log` crate
            name if name.starts_with("log.") => (),
            name => self.fields.push(format!("{name}={value:?}")),
        }
    }
}
