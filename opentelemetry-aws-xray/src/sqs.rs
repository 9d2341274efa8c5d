//! SQS message system attribute carrier for X-Ray context propagation.
//!
//! SQS records the trace header of the sending request in the
//! `AWSTraceHeader` system attribute, not in the user message attributes.

use crate::propagator::TRACE_HEADER;
use aws_sdk_sqs::types::MessageSystemAttributeName;
use opentelemetry::propagation::Extractor;
use std::collections::HashMap;

/// An [`Extractor`] over SQS message system attributes.
///
/// Answers lookups of [`TRACE_HEADER`] from the `AWSTraceHeader` attribute;
/// any other key is looked up by its system attribute name.
///
/// # Example
///
/// ```ignore
/// use opentelemetry::propagation::TextMapPropagator;
/// use opentelemetry_aws_xray::{sqs::MessageSystemAttributesExtractor, XrayPropagator};
///
/// if let Some(attrs) = msg.attributes() {
///     let parent_cx = XrayPropagator::new().extract(&MessageSystemAttributesExtractor(attrs));
/// }
/// ```
pub struct MessageSystemAttributesExtractor<'a>(pub &'a HashMap<MessageSystemAttributeName, String>);

impl<'a> MessageSystemAttributesExtractor<'a> {
    /// Returns the raw `AWSTraceHeader` value, if the message carries one.
    pub fn trace_header(&self) -> Option<&'a str> {
        self.0
            .get(&MessageSystemAttributeName::AwsTraceHeader)
            .map(String::as_str)
    }
}

impl Extractor for MessageSystemAttributesExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        if key.eq_ignore_ascii_case(TRACE_HEADER) {
            return self.trace_header();
        }
        self.0
            .get(&MessageSystemAttributeName::from(key))
            .map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
