//! Diagnostics output for the `tracing` macros used across the crate.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "chatbox=info";

/// Where diagnostics go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    /// Append to a file.
    File(PathBuf),
    Stderr,
    /// Drop everything. The TUI owns stderr's screen.
    Disabled,
}

impl TraceTarget {
    /// File when one was given, otherwise stderr for one-shot commands and
    /// nothing for the interactive UI.
    pub fn select(trace_file: Option<&Path>, interactive: bool) -> Self {
        match trace_file {
            Some(path) => TraceTarget::File(path.to_path_buf()),
            None if interactive => TraceTarget::Disabled,
            None => TraceTarget::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once, before any session starts.
pub fn init_tracing(target: &TraceTarget) -> io::Result<()> {
    match target {
        TraceTarget::Disabled => {}
        TraceTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(io::stderr),
                )
                .init();
        }
        TraceTarget::File(path) => {
            let log_file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(log_file)),
                )
                .init();
        }
    }
    Ok(())
}
