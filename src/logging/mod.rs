//! Process logging and the bridge from trace diagnostics into it.

mod level;
mod xray_logger;

pub use level::{UnknownLogLevel, XrayLogLevel};
pub use xray_logger::{TraceLogger, XrayLoggerOptions, XrayTracingLogger};

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: human-readable lines on stderr, filtered
/// by `RUST_LOG` (default `info`).
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// The trace logger every driver uses: threshold from `--xray-log-level`,
/// everything forwarded at info.
pub fn xray_logger(level: XrayLogLevel) -> XrayTracingLogger {
    XrayTracingLogger::new(
        level,
        XrayLoggerOptions {
            fix_level: Some(XrayLogLevel::Info),
        },
    )
}
