use std::{env, sync::Arc};

use leveled_log::{FilterMode, Logger, LoggerConfig, LoggerLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Console output, colored by severity
    leveled_log::configure(LoggerConfig::default().with_app_name("demo").with_level(0));
    leveled_log::debug("startup", "reading configuration");
    leveled_log::info("startup", "configuration loaded");
    leveled_log::warning_json("startup", "no cache directory configured");

    // Only WARNING and above
    leveled_log::configure(LoggerConfig::default().with_app_name("demo").with_level(2));
    leveled_log::info("filter", "not shown");
    leveled_log::error("filter", "shown");

    // Inverted threshold: DEBUG and INFO only
    leveled_log::configure(
        LoggerConfig::default()
            .with_app_name("demo")
            .with_level(1)
            .with_filter_mode(FilterMode::UpToThreshold),
    );
    leveled_log::debug("filter", "shown");
    leveled_log::error("filter", "not shown");

    // File output, uncolored, appended to `<tmp>/leveled_log_demo/demo.log`
    let log_path = env::temp_dir().join("leveled_log_demo").join("demo.log");
    match leveled_log::try_configure(
        LoggerConfig::default()
            .with_app_name("demo")
            .with_log_path(&log_path)
            .with_level(0),
    ) {
        Ok(()) => {
            leveled_log::info("file", "written to the log file");
            leveled_log::critical_json("file", "structured line in the log file");
            println!("Appended two lines to {}", log_path.display());
        }
        Err(error) => println!("File logging unavailable: {error}"),
    }

    // A path below a regular file cannot be created: output stays where it was
    leveled_log::configure(
        LoggerConfig::default()
            .with_app_name("demo")
            .with_log_path(log_path.join("impossible.log"))
            .with_level(0),
    );
    if let Some(error) = leveled_log::take_last_error() {
        println!("Diagnostic channel reported: {error}");
    }

    // An independent logger that also receives `tracing` events
    let logger = Arc::new(Logger::new(
        LoggerConfig::default().with_app_name("traced").with_level(0),
    ));
    tracing_subscriber::registry()
        .with(LoggerLayer::new(Arc::clone(&logger)))
        .init();
    tracing::info!(target: "bridge", peers = 3, "cluster joined");
    logger.warning("bridge", "logged directly");
}
