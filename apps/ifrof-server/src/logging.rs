use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive: `-v` flags win, then `RUST_LOG`, then the configured level.
pub fn filter_directive(cfg: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.level.clone()),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

/// Installs the global subscriber. Logs go to stderr so that stdout stays
/// clean for `--print-config` and the token commands.
pub fn init(cfg: &LoggingConfig, verbose: u8) {
    let directive = filter_directive(cfg, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directive}': {e}; falling back to 'info'");
        EnvFilter::new("info")
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match cfg.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
