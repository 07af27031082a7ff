//! Tracing/logging setup shared by the `sca` binary and tests.

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event.
    #[default]
    Pretty,
    Json,
}

/// Logging options resolved by the caller (usually from CLI flags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogOptions {
    pub format: LogFormat,
    /// Raise the default level from `info` to `debug`. `RUST_LOG` still wins.
    pub verbose: bool,
}

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(options: LogOptions) {
    tracing::init(options);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
