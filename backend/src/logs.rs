//! Pipeline progress logging on `tracing`.
//!
//! Diagnostics are `tracing` events written to stderr, leaving stdout for
//! command output. The binary picks the format (human-readable text or one
//! JSON object per line) and the level; `RUST_LOG` overrides the level.
//!
//! ```rust,ignore
//! use tbyn::logs::{init_logging, LogConfig, LogFormat};
//!
//! init_logging(&LogConfig::default().with_format(LogFormat::Json).with_quiet(true));
//! ```

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One plain line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Whether to use ANSI colors in text output.
    pub with_ansi: bool,
    /// Let `RUST_LOG` override `level`.
    pub from_env: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            with_ansi: true,
            from_env: true,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Quiet mode keeps only warnings and errors.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.level = if quiet { Level::WARN } else { Level::INFO };
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_env(mut self, enable: bool) -> Self {
        self.from_env = enable;
        self
    }
}

type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync + 'static>;

/// Initialize the global subscriber, writing to stderr.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) {
    build_subscriber(config, std::io::stderr).init();
}

/// Build a subscriber for `config` that writes to `writer`.
pub fn build_subscriber<W>(config: &LogConfig, writer: W) -> BoxedSubscriber
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(false)
                .without_time();
            Box::new(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .with_level(false)
                .without_time();
            Box::new(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let level = config.level.as_str().to_lowercase();
    if config.from_env {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

pub fn log_info(msg: impl Into<String>) {
    tracing::info!("   {}", msg.into());
}

pub fn log_success(msg: impl Into<String>) {
    tracing::info!("   ✓ {}", msg.into());
}

pub fn log_warning(msg: impl Into<String>) {
    tracing::warn!("   ⚠️ {}", msg.into());
}

pub fn log_error(msg: impl Into<String>) {
    tracing::error!("   ❌ {}", msg.into());
}

/// Info line nested under the previous one.
pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    tracing::info!("{}   {}", "   ".repeat(indent as usize), msg.into());
}
