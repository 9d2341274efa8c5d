//! Export of trace segments.

use datadog_opentelemetry::configuration::Config;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::warn;

/// Builds the tracer provider segments are exported through.
///
/// Export follows the Datadog agent settings in the environment (`DD_AGENT_HOST`,
/// `DD_TRACE_ENABLED`, ...); the service name is the command name.
pub fn init_tracer_provider(service: &str) -> SdkTracerProvider {
    datadog_opentelemetry::tracing()
        .with_config(Config::builder().set_service(service.to_string()).build())
        .init()
}

/// Flushes pending segments. Failures are logged, never fatal.
pub fn shutdown(provider: SdkTracerProvider) {
    if let Err(e) = provider.shutdown() {
        warn!(error = %e, "failed to flush trace segments");
    }
}
