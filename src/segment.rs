//! Trace segments: one span per logical operation, closed exactly once.

use crate::logging::{TraceLogger, XrayLogLevel};
use opentelemetry::trace::{Status, TraceContextExt, TraceId, Tracer};
use opentelemetry::Context;
use opentelemetry_aws_xray::{format_trace_header, xray_trace_id, TraceHeader, TraceHeaderInterceptor};
use std::borrow::Cow;
use std::sync::Arc;

/// Begins segments on an OpenTelemetry tracer and reports its own
/// diagnostics through a [`TraceLogger`].
pub struct SegmentTracer<T> {
    tracer: T,
    logger: Arc<dyn TraceLogger>,
}

impl<T> SegmentTracer<T>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    pub fn new(tracer: T, logger: impl TraceLogger + 'static) -> Self {
        Self {
            tracer,
            logger: Arc::new(logger),
        }
    }

    /// Begins a segment that starts a new trace.
    pub fn begin_segment(&self, name: impl Into<Cow<'static, str>>) -> Segment {
        self.start(name.into(), &Context::new(), None)
    }

    /// Begins a segment continuing the trace described by an X-Ray header.
    ///
    /// The segment's parent is the header's `Parent` id. A header naming only
    /// its `Root` continues that trace without a parent. A header whose root
    /// does not parse is reported at warn and a new trace is started instead.
    pub fn segment_from_header(&self, name: impl Into<Cow<'static, str>>, header: &str) -> Segment {
        let name = name.into();
        let Some(parsed) = TraceHeader::parse(header) else {
            self.logger.log(
                XrayLogLevel::Warn,
                &format_args!("ignoring malformed trace header {header:?}"),
            );
            return self.start(name, &Context::new(), None);
        };
        match parsed.span_context() {
            Some(span_context) => {
                self.start(name, &Context::new().with_remote_span_context(span_context), None)
            }
            None => self.start(name, &Context::new(), Some(parsed.trace_id)),
        }
    }

    fn start(&self, name: Cow<'static, str>, parent: &Context, trace_id: Option<TraceId>) -> Segment {
        self.logger
            .log(XrayLogLevel::Debug, &format_args!("Beginning segment named {name}"));
        let mut builder = self.tracer.span_builder(name.clone());
        if let Some(trace_id) = trace_id {
            builder = builder.with_trace_id(trace_id);
        }
        let span = self.tracer.build_with_context(builder, parent);
        Segment {
            name,
            cx: parent.with_span(span),
            logger: Arc::clone(&self.logger),
            closed: false,
        }
    }
}

/// An open trace segment.
///
/// [`close`](Segment::close) records the outcome and ends the span; a segment
/// dropped without being closed is ended with its status unset.
pub struct Segment {
    name: Cow<'static, str>,
    cx: Context,
    logger: Arc<dyn TraceLogger>,
    closed: bool,
}

impl Segment {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Context holding this segment's span, for child work and propagation.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// Trace id in X-Ray notation (`1-xxxxxxxx-xxxxxxxxxxxxxxxxxxxxxxxx`).
    pub fn trace_id(&self) -> String {
        xray_trace_id(self.cx.span().span_context().trace_id())
    }

    /// The X-Ray header naming this segment as parent.
    pub fn trace_header(&self) -> Option<String> {
        format_trace_header(self.cx.span().span_context())
    }

    /// Interceptor stamping SDK requests with this segment's trace header.
    pub fn interceptor(&self) -> TraceHeaderInterceptor {
        TraceHeaderInterceptor::new(self.cx.clone())
    }

    /// Records the outcome and ends the segment.
    pub fn close(mut self, err: Option<&anyhow::Error>) {
        let span = self.cx.span();
        match err {
            Some(err) => span.set_status(Status::error(format!("{err:#}"))),
            None => span.set_status(Status::Ok),
        }
        self.logger.log(
            XrayLogLevel::Debug,
            &format_args!("Closing segment named {}", self.name),
        );
        span.end();
        self.closed = true;
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        if !self.closed {
            self.logger.log(
                XrayLogLevel::Debug,
                &format_args!("Segment named {} dropped without close", self.name),
            );
            self.cx.span().end();
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("name", &self.name())
            .field("trace_id", &self.trace_id())
            .field("closed", &self.closed)
            .finish()
    }
}
