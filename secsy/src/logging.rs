//! Tracing setup

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    level: &'static str,
}

impl LoggingConfig {
    /// `-vv` wins over everything; `DEBUG` or `-v` give debug
    pub fn new(debug: bool, verbose: u8) -> Self {
        let level = match verbose {
            2.. => "trace",
            1 => "debug",
            0 if debug => "debug",
            _ => "info",
        };
        Self { level }
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    /// Logs go to stderr so findings on stdout stay pipeable.
    /// `RUST_LOG` overrides the computed level.
    pub fn init(self) {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level)))
            .init();
    }
}
