//! Small command-line drivers for SES, SNS and SQS that trace every call as
//! an X-Ray style segment and print each service response as YAML.
//!
//! The binaries under `src/` are thin: they parse flags, install logging and
//! the tracer provider, and hand off to [`email::run`], [`publish::run`] or
//! [`subscribe::run`].

pub mod cancel;
pub mod cli;
pub mod email;
pub mod logging;
pub mod output;
pub mod publish;
pub mod segment;
pub mod subscribe;
pub mod telemetry;
pub mod yaml;
