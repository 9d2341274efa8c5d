//! OpenTelemetry context propagation in the AWS X-Ray trace header format.
//!
//! AWS services pass trace context around in the `X-Amzn-Trace-Id` HTTP header
//! and, for SQS, in the `AWSTraceHeader` message system attribute. This crate
//! provides a [`TextMapPropagator`](opentelemetry::propagation::TextMapPropagator)
//! for that format plus carriers for the places it shows up.
//!
//! # Features
//!
//! - `sqs` - Enables extraction from SQS message system attributes (enabled by default)
//! - `interceptor` - Enables the AWS SDK interceptor that stamps outgoing
//!   requests with the trace header (enabled by default)
//!
//! # Example
//!
//! ## Continuing a trace from an SQS message
//!
//! ```ignore
//! use opentelemetry::propagation::TextMapPropagator;
//! use opentelemetry_aws_xray::{sqs::MessageSystemAttributesExtractor, XrayPropagator};
//!
//! let parent_cx = msg
//!     .attributes()
//!     .map(|attrs| XrayPropagator::new().extract(&MessageSystemAttributesExtractor(attrs)));
//! ```
//!
//! ## Propagating the current segment to an AWS call
//!
//! ```ignore
//! use opentelemetry_aws_xray::interceptor::TraceHeaderInterceptor;
//!
//! client
//!     .publish()
//!     .topic_arn(&topic_arn)
//!     .customize()
//!     .interceptor(TraceHeaderInterceptor::new(cx.clone()))
//!     .send()
//!     .await?;
//! ```

mod propagator;

#[cfg(feature = "sqs")]
pub mod sqs;

#[cfg(feature = "interceptor")]
pub mod interceptor;

pub use propagator::{
    format_trace_header, parse_trace_header, xray_trace_id, TraceHeader, XrayPropagator, TRACE_HEADER,
};

#[cfg(feature = "sqs")]
pub use sqs::MessageSystemAttributesExtractor as SqsMessageSystemAttributesExtractor;

#[cfg(feature = "interceptor")]
pub use interceptor::TraceHeaderInterceptor;
