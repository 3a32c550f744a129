use std::io::{self, IsTerminal};

use configs::{LogFormat, LoggingConfig};
use tracing_subscriber::fmt::{writer::BoxMakeWriter, MakeWriter};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

type BoxSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

/// Stream log lines go to. Binaries that print results on stdout log to `Stderr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

impl LogTarget {
    /// Colour only when a person is watching the stream.
    pub fn is_terminal(self) -> bool {
        match self {
            LogTarget::Stdout => io::stdout().is_terminal(),
            LogTarget::Stderr => io::stderr().is_terminal(),
        }
    }

    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stdout => BoxMakeWriter::new(io::stdout),
            LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
        }
    }
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Build (without installing) a subscriber for `format` writing to `writer`.
pub fn subscriber<W>(format: LogFormat, filter: EnvFilter, writer: W, ansi: bool) -> BoxSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt().with_env_filter(filter).with_target(false).with_writer(writer);
    match format {
        LogFormat::Compact => Box::new(builder.with_ansi(ansi).compact().finish()),
        LogFormat::Json => Box::new(builder.with_ansi(false).json().finish()),
    }
}

fn install(format: LogFormat, filter: EnvFilter, target: LogTarget) {
    let _ = subscriber(format, filter, target.make_writer(), target.is_terminal()).try_init();
}

/// JSON structured output to `target`.
/// - Respects `RUST_LOG` if set, defaults to `info,service::cat=debug`
pub fn init_logging_json(target: LogTarget) {
    install(LogFormat::Json, env_filter_or("info,service::cat=debug"), target);
}

/// Initialize from the `[logging]` section. `RUST_LOG` still wins over `filter`.
pub fn init_logging(cfg: &LoggingConfig, target: LogTarget) {
    install(cfg.format, env_filter_or(cfg.filter.as_str()), target);
}
