//! Logging setup
//!
//! Every run logs to the console and, when the local syslog daemon is reachable,
//! to `/dev/log` with facility `local0`. If the syslog socket cannot be opened the
//! subscriber is built with the console layer only.

pub mod syslog;

use std::io::{IsTerminal, Write};
use std::path::Path;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use syslog::SyslogMakeWriter;

pub const SYSLOG_SOCKET: &str = "/dev/log";

/// Where log lines end up after initialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    ConsoleAndSyslog,
    ConsoleOnly,
}

/// Console stream for human-readable log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    /// JSON output owns stdout, so logs move to stderr
    pub fn for_output(json_output: bool) -> Self {
        if json_output {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }

    pub fn is_terminal(self) -> bool {
        match self {
            Self::Stdout => std::io::stdout().is_terminal(),
            Self::Stderr => std::io::stderr().is_terminal(),
        }
    }

    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }

    fn notice(self, message: &str) {
        let _ = match self {
            Self::Stdout => writeln!(std::io::stdout(), "{}", message),
            Self::Stderr => writeln!(std::io::stderr(), "{}", message),
        };
    }
}

/// Colours only for a terminal, and never when `NO_COLOR` is set to anything non-empty
pub fn ansi_enabled(is_terminal: bool, no_color: Option<&str>) -> bool {
    is_terminal && no_color.is_none_or(str::is_empty)
}

/// Initialize the logging system
///
/// `ident` tags each syslog line (e.g. `co2_alert`). `RUST_LOG` takes
/// precedence over the default level; `verbose` lowers the default to DEBUG.
pub fn init_logging(ident: &'static str, verbose: bool, console: ConsoleStream) -> LogTarget {
    init_logging_with_socket(ident, verbose, console, Path::new(SYSLOG_SOCKET))
}

pub fn init_logging_with_socket(
    ident: &'static str,
    verbose: bool,
    console: ConsoleStream,
    socket: &Path,
) -> LogTarget {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let no_color = std::env::var("NO_COLOR").ok();
    let console_layer = fmt::layer()
        .with_writer(console.make_writer())
        .with_ansi(ansi_enabled(console.is_terminal(), no_color.as_deref()))
        .with_target(true);

    let syslog_layer = match SyslogMakeWriter::connect(socket, ident) {
        Ok(writer) => Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .without_time()
                .with_level(false)
                .with_target(false),
        ),
        Err(e) => {
            console.notice(&format!(
                "Failed to connect to system log ({}): {}",
                socket.display(),
                e
            ));
            console.notice("Logging to the console only");
            None
        }
    };

    let target = if syslog_layer.is_some() {
        LogTarget::ConsoleAndSyslog
    } else {
        LogTarget::ConsoleOnly
    };

    // Another subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(syslog_layer)
        .try_init();

    target
}
