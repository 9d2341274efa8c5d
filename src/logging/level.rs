use std::fmt;
use std::str::FromStr;

/// Severity of a tracing-SDK diagnostic, as accepted by `--xray-log-level`.
///
/// Parsing is case-insensitive; [`Display`](fmt::Display) renders the
/// lowercase name, so the two round-trip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum XrayLogLevel {
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl XrayLogLevel {
    pub const ALL: [XrayLogLevel; 4] = [
        XrayLogLevel::Debug,
        XrayLogLevel::Info,
        XrayLogLevel::Warn,
        XrayLogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            XrayLogLevel::Debug => "debug",
            XrayLogLevel::Info => "info",
            XrayLogLevel::Warn => "warn",
            XrayLogLevel::Error => "error",
        }
    }
}

impl fmt::Display for XrayLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct UnknownLogLevel(pub String);

impl FromStr for XrayLogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        XrayLogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or(UnknownLogLevel(lower))
    }
}
