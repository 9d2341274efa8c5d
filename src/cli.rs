//! Flags and environment shared by every command.

use crate::logging::XrayLogLevel;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::Args;
use std::io::ErrorKind;
use std::path::Path;

/// Flags every command accepts.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// AWS region; the SDK's default provider chain is used when unset
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// debug|info|warn|error
    #[arg(long, default_value_t = XrayLogLevel::Error)]
    pub xray_log_level: XrayLogLevel,
}

/// Configuration problems, reported before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--{0} must be specified")]
    Missing(&'static str),

    #[error("{field}: invalid address {address:?}: {source}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("building message: {0}")]
    Message(#[from] lettre::error::Error),
}

/// Returns the flag value, treating an empty string as absent.
pub fn require<'a>(value: Option<&'a str>, flag: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(flag))
}

/// Loads `.env` from the working directory or its parents, if there is one.
///
/// A missing file is fine; a file that cannot be read or parsed is returned
/// so the caller can report it once logging is up.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    tolerate_missing(dotenvy::dotenv())
}

fn tolerate_missing<T>(result: Result<T, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Name the process was invoked as; segments are named after it.
pub fn app_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// SDK config from the environment, with `--region` taking precedence.
pub async fn load_sdk_config(common: &CommonArgs) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = common.region.as_deref().filter(|r| !r.is_empty()) {
        loader = loader.region(Region::new(region.to_owned()));
    }
    loader.load().await
}
