//! AWS SDK interceptor that propagates a trace context as `X-Amzn-Trace-Id`.

use crate::propagator::XrayPropagator;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeTransmitInterceptorContextMut;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_runtime_api::http::Headers;
use aws_smithy_types::config_bag::ConfigBag;
use opentelemetry::propagation::{Injector, TextMapPropagator};
use opentelemetry::Context;

/// Stamps every request of an operation with the trace header of `cx`.
///
/// Attach it per call, so the header names the segment the call runs in:
///
/// ```ignore
/// client
///     .delete_message()
///     .queue_url(queue_url)
///     .receipt_handle(receipt_handle)
///     .customize()
///     .interceptor(TraceHeaderInterceptor::new(segment.context().clone()))
///     .send()
///     .await?;
/// ```
///
/// A context without a valid span leaves the request untouched.
#[derive(Clone, Debug)]
pub struct TraceHeaderInterceptor {
    cx: Context,
}

impl TraceHeaderInterceptor {
    pub fn new(cx: Context) -> Self {
        Self { cx }
    }
}

impl Intercept for TraceHeaderInterceptor {
    fn name(&self) -> &'static str {
        "TraceHeaderInterceptor"
    }

    fn modify_before_signing(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let mut injector = HeaderInjector(context.request_mut().headers_mut());
        XrayPropagator::new().inject_context(&self.cx, &mut injector);
        Ok(())
    }
}

/// An [`Injector`] over the headers of an outgoing SDK request.
pub struct HeaderInjector<'a>(pub &'a mut Headers);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_trace_header, TRACE_HEADER};
    use opentelemetry::trace::TraceContextExt;

    const HEADER: &str = "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1";

    #[test]
    fn test_injector_sets_header() {
        let mut headers = Headers::new();
        let mut injector = HeaderInjector(&mut headers);

        injector.set(TRACE_HEADER, HEADER.to_string());

        assert_eq!(headers.get("x-amzn-trace-id"), Some(HEADER));
    }

    #[test]
    fn test_injector_overwrites_existing_header() {
        let mut headers = Headers::new();
        let mut injector = HeaderInjector(&mut headers);

        injector.set(TRACE_HEADER, "first".to_string());
        injector.set(TRACE_HEADER, HEADER.to_string());

        assert_eq!(headers.get(TRACE_HEADER), Some(HEADER));
    }

    #[test]
    fn test_propagator_writes_context_into_headers() {
        let cx = Context::new().with_remote_span_context(parse_trace_header(HEADER).unwrap());
        let mut headers = Headers::new();

        XrayPropagator::new().inject_context(&cx, &mut HeaderInjector(&mut headers));

        assert_eq!(headers.get(TRACE_HEADER), Some(HEADER));
    }

    #[test]
    fn test_interceptor_name() {
        assert_eq!(
            TraceHeaderInterceptor::new(Context::new()).name(),
            "TraceHeaderInterceptor"
        );
    }

    #[cfg(feature = "sqs")]
    fn capturing_sqs_client() -> (
        aws_sdk_sqs::Client,
        aws_smithy_http_client::test_util::CaptureRequestReceiver,
    ) {
        use aws_sdk_sqs::config::{BehaviorVersion, Credentials, Region};

        let (http_client, requests) = aws_smithy_http_client::test_util::capture_request(None);
        let config = aws_sdk_sqs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .http_client(http_client)
            .build();
        (aws_sdk_sqs::Client::from_conf(config), requests)
    }

    #[cfg(feature = "sqs")]
    #[tokio::test]
    async fn test_interceptor_stamps_outgoing_request() {
        let (client, requests) = capturing_sqs_client();
        let cx = Context::new().with_remote_span_context(parse_trace_header(HEADER).unwrap());

        let _ = client
            .delete_message()
            .queue_url("https://sqs.us-east-1.amazonaws.com/123456789012/test")
            .receipt_handle("rh-1")
            .customize()
            .interceptor(TraceHeaderInterceptor::new(cx))
            .send()
            .await;

        let request = requests.expect_request();
        assert_eq!(request.headers().get("x-amzn-trace-id"), Some(HEADER));
    }

    #[cfg(feature = "sqs")]
    #[tokio::test]
    async fn test_interceptor_without_span_leaves_request_alone() {
        let (client, requests) = capturing_sqs_client();

        let _ = client
            .delete_message()
            .queue_url("https://sqs.us-east-1.amazonaws.com/123456789012/test")
            .receipt_handle("rh-1")
            .customize()
            .interceptor(TraceHeaderInterceptor::new(Context::new()))
            .send()
            .await;

        let request = requests.expect_request();
        assert_eq!(request.headers().get("x-amzn-trace-id"), None);
    }
}
