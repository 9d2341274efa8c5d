//! The X-Ray trace header format.
//!
//! Header format: `Root=1-{epoch}-{random};Parent={span-id};Sampled={0|1}`

use opentelemetry::propagation::text_map_propagator::FieldIter;
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use std::sync::LazyLock;

/// Name of the HTTP header AWS uses to carry trace context.
pub const TRACE_HEADER: &str = "X-Amzn-Trace-Id";

static TRACE_HEADER_FIELDS: LazyLock<[String; 1]> = LazyLock::new(|| [TRACE_HEADER.to_owned()]);

/// Propagates span context in the X-Ray trace header format.
#[derive(Clone, Debug, Default)]
pub struct XrayPropagator {
    _private: (),
}

impl XrayPropagator {
    /// Creates a new X-Ray propagator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextMapPropagator for XrayPropagator {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        if let Some(header) = format_trace_header(cx.span().span_context()) {
            injector.set(TRACE_HEADER, header);
        }
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        extractor
            .get(TRACE_HEADER)
            .and_then(parse_trace_header)
            .map(|span_context| cx.with_remote_span_context(span_context))
            .unwrap_or_else(|| cx.clone())
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(TRACE_HEADER_FIELDS.as_ref())
    }
}

/// The fields of an X-Ray trace header.
///
/// Only `Root` is mandatory; a header without `Parent` still names the trace
/// it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceHeader {
    pub trace_id: TraceId,
    pub parent_id: Option<SpanId>,
    pub sampled: bool,
}

impl TraceHeader {
    /// Parses a header. Returns `None` when `Root` is missing or malformed; a
    /// malformed `Parent` is treated as absent. Unknown keys (e.g. `Lineage`)
    /// are ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let mut trace_id = None;
        let mut parent_id = None;
        let mut sampled = false;

        for part in header.split(';') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "Root" => trace_id = parse_root(value),
                "Parent" => parent_id = parse_parent(value),
                "Sampled" => sampled = value == "1",
                _ => {}
            }
        }

        let trace_id = trace_id.filter(|id| *id != TraceId::INVALID)?;
        Some(Self {
            trace_id,
            parent_id: parent_id.filter(|id| *id != SpanId::INVALID),
            sampled,
        })
    }

    /// The remote parent this header describes, if it names one.
    pub fn span_context(&self) -> Option<SpanContext> {
        let flags = if self.sampled {
            TraceFlags::SAMPLED
        } else {
            TraceFlags::default()
        };
        let span_context =
            SpanContext::new(self.trace_id, self.parent_id?, flags, true, TraceState::default());
        span_context.is_valid().then_some(span_context)
    }
}

/// Parses an X-Ray trace header into a remote [`SpanContext`].
///
/// Returns `None` unless both the root and the parent id are present and
/// well formed; see [`TraceHeader::parse`] for headers without a parent.
///
/// # Example
///
/// ```
/// use opentelemetry_aws_xray::parse_trace_header;
///
/// let header = "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1";
/// let ctx = parse_trace_header(header);
/// assert!(ctx.is_some());
/// ```
pub fn parse_trace_header(header: &str) -> Option<SpanContext> {
    TraceHeader::parse(header)?.span_context()
}

/// Formats a span context as an X-Ray trace header.
///
/// Returns `None` for an invalid (empty) span context.
pub fn format_trace_header(span_context: &SpanContext) -> Option<String> {
    if !span_context.is_valid() {
        return None;
    }
    let sampled = if span_context.is_sampled() { 1 } else { 0 };
    Some(format!(
        "Root={};Parent={:016x};Sampled={}",
        xray_trace_id(span_context.trace_id()),
        span_context.span_id(),
        sampled
    ))
}

/// Renders a trace id the way X-Ray shows it: `1-{8 hex}-{24 hex}`.
pub fn xray_trace_id(trace_id: TraceId) -> String {
    let hex = format!("{:032x}", trace_id);
    format!("1-{}-{}", &hex[..8], &hex[8..])
}

/// `1-{epoch}-{random}` is 8 + 24 hex characters after the version.
fn parse_root(root: &str) -> Option<TraceId> {
    let mut parts = root.split('-');
    let (Some("1"), Some(epoch), Some(random), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if epoch.len() != 8 || random.len() != 24 || !is_hex(epoch) || !is_hex(random) {
        return None;
    }
    TraceId::from_hex(&format!("{epoch}{random}")).ok()
}

fn parse_parent(parent: &str) -> Option<SpanId> {
    if parent.len() != 16 || !is_hex(parent) {
        return None;
    }
    SpanId::from_hex(parent).ok()
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HEADER: &str = "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1";

    #[test]
    fn test_parse_valid_header() {
        let ctx = parse_trace_header(HEADER).unwrap();

        assert_eq!(
            ctx.trace_id(),
            TraceId::from_hex("5759e988bd862e3fe1be46a994272793").unwrap()
        );
        assert_eq!(ctx.span_id(), SpanId::from_hex("53995c3f42cd8ad8").unwrap());
        assert!(ctx.is_sampled());
        assert!(ctx.is_remote());
    }

    #[test]
    fn test_parse_not_sampled() {
        let header = "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=0";
        let ctx = parse_trace_header(header).unwrap();
        assert!(!ctx.is_sampled());
    }

    #[test]
    fn test_parse_ignores_order_and_unknown_keys() {
        let header = "Sampled=1; Lineage=a87bd80c:1|68fd508a:5 ;Parent=53995c3f42cd8ad8;Root=1-5759e988-bd862e3fe1be46a994272793";
        let ctx = parse_trace_header(header).unwrap();
        assert_eq!(ctx.span_id(), SpanId::from_hex("53995c3f42cd8ad8").unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_headers() {
        for header in [
            "",
            "garbage",
            "Root=1-5759e988-bd862e3fe1be46a994272793",
            "Parent=53995c3f42cd8ad8;Sampled=1",
            "Root=2-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8",
            "Root=1-5759e98-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8",
            "Root=1-5759e988-bd862e3fe1be46a99427279z;Parent=53995c3f42cd8ad8",
            "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad",
            "Root=1-00000000-000000000000000000000000;Parent=53995c3f42cd8ad8",
        ] {
            assert!(parse_trace_header(header).is_none(), "accepted {header:?}");
        }
    }

    #[test]
    fn test_header_without_parent_keeps_root() {
        let header = TraceHeader::parse("Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=1").unwrap();

        assert_eq!(
            header.trace_id,
            TraceId::from_hex("5759e988bd862e3fe1be46a994272793").unwrap()
        );
        assert_eq!(header.parent_id, None);
        assert!(header.sampled);
        assert_eq!(header.span_context(), None);
    }

    #[test]
    fn test_header_with_bad_parent_keeps_root() {
        let header =
            TraceHeader::parse("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=xyz").unwrap();
        assert_eq!(header.parent_id, None);
    }

    #[test]
    fn test_header_without_root_is_rejected() {
        for header in [
            "",
            "Parent=53995c3f42cd8ad8;Sampled=1",
            "Root=1-00000000-000000000000000000000000;Parent=53995c3f42cd8ad8",
            "Root=nonsense",
        ] {
            assert_eq!(TraceHeader::parse(header), None, "accepted {header:?}");
        }
    }

    #[test]
    fn test_format_matches_parsed_header() {
        let ctx = parse_trace_header(HEADER).unwrap();
        assert_eq!(format_trace_header(&ctx).as_deref(), Some(HEADER));
    }

    #[test]
    fn test_format_invalid_context_is_none() {
        assert_eq!(format_trace_header(&SpanContext::empty_context()), None);
    }

    #[test]
    fn test_xray_trace_id_layout() {
        let id = TraceId::from_hex("5759e988bd862e3fe1be46a994272793").unwrap();
        assert_eq!(xray_trace_id(id), "1-5759e988-bd862e3fe1be46a994272793");
    }

    #[test]
    fn test_propagator_round_trip() {
        let propagator = XrayPropagator::new();
        let mut carrier = HashMap::new();
        carrier.insert(TRACE_HEADER.to_lowercase(), HEADER.to_string());

        let cx = propagator.extract(&carrier);
        assert!(cx.has_active_span());

        let mut injected: HashMap<String, String> = HashMap::new();
        propagator.inject_context(&cx, &mut injected);
        assert_eq!(
            injected.get(&TRACE_HEADER.to_lowercase()).map(String::as_str),
            Some(HEADER)
        );
    }

    #[test]
    fn test_propagator_without_header_keeps_context() {
        let carrier: HashMap<String, String> = HashMap::new();
        let cx = XrayPropagator::new().extract(&carrier);
        assert!(!cx.span().span_context().is_valid());

        let mut injected: HashMap<String, String> = HashMap::new();
        XrayPropagator::new().inject_context(&cx, &mut injected);
        assert!(injected.is_empty());
    }

    #[test]
    fn test_fields_lists_trace_header() {
        let propagator = XrayPropagator::new();
        let fields: Vec<&str> = propagator.fields().collect();
        assert_eq!(fields, vec![TRACE_HEADER]);
    }
}
