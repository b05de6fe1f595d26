//! Telemetry for Stockast
//!
//! Structured logging through `tracing`, with optional OTLP export of traces
//! and upstream-call metrics

mod metadata;
pub mod metrics;

use std::time::Duration;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use stockast_config::TelemetryConfig;
use stockast_config::telemetry::exporters::{ExportProtocol, ExporterConfig};

/// Guard that flushes and shuts down exporters on drop
pub struct TelemetryGuard {
    meter_provider: Option<SdkMeterProvider>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.meter_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown meter provider: {e}");
        }
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize logging and, when configured, OTLP export
///
/// The log filter comes from `RUST_LOG` when set, then from
/// `telemetry.log_filter`, then from `default_filter`. Returns a guard that
/// must be held for the lifetime of the application.
///
/// # Errors
///
/// Returns an error if an OTLP exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let configured = config.and_then(|c| c.log_filter.as_deref()).unwrap_or(default_filter);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut guard = TelemetryGuard {
        meter_provider: None,
        tracer_provider: None,
    };

    let mut otel_layer = None;

    if let Some(config) = config {
        let resource = metadata::build_resource(config);

        if let Some(exporter) = metrics_exporter(config) {
            let provider = init_metrics(exporter, config, resource.clone())?;
            global::set_meter_provider(provider.clone());
            guard.meter_provider = Some(provider);
        }

        if let Some(exporter) = trace_exporter(config) {
            let provider = init_tracer(exporter, config, resource)?;
            otel_layer = Some(tracing_opentelemetry::layer().with_tracer(provider.tracer("stockast")));
            global::set_tracer_provider(provider.clone());
            guard.tracer_provider = Some(provider);
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn trace_exporter(config: &TelemetryConfig) -> Option<&ExporterConfig> {
    config
        .tracing
        .as_ref()
        .and_then(|t| t.exporter.as_ref())
        .or(config.exporter.as_ref())
}

fn metrics_exporter(config: &TelemetryConfig) -> Option<&ExporterConfig> {
    config
        .metrics
        .as_ref()
        .and_then(|m| m.exporter.as_ref())
        .or(config.exporter.as_ref())
}

fn init_metrics(
    exporter_config: &ExporterConfig,
    config: &TelemetryConfig,
    resource: opentelemetry_sdk::Resource,
) -> anyhow::Result<SdkMeterProvider> {
    use opentelemetry_otlp::{MetricExporter, WithExportConfig};
    use opentelemetry_sdk::metrics::PeriodicReader;

    let endpoint = exporter_config.endpoint.as_str();
    let exporter = match exporter_config.protocol {
        ExportProtocol::Grpc => MetricExporter::builder().with_tonic().with_endpoint(endpoint).build(),
        ExportProtocol::HttpProto => MetricExporter::builder().with_http().with_endpoint(endpoint).build(),
    }
    .map_err(|e| anyhow::anyhow!("failed to build metrics exporter: {e}"))?;

    let interval = config.metrics.as_ref().map_or(30, |m| m.interval_seconds);
    let reader = PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(interval))
        .build();

    Ok(SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build())
}

fn init_tracer(
    exporter_config: &ExporterConfig,
    config: &TelemetryConfig,
    resource: opentelemetry_sdk::Resource,
) -> anyhow::Result<SdkTracerProvider> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::Sampler;

    let endpoint = exporter_config.endpoint.as_str();
    let exporter = match exporter_config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder().with_tonic().with_endpoint(endpoint).build(),
        ExportProtocol::HttpProto => SpanExporter::builder().with_http().with_endpoint(endpoint).build(),
    }
    .map_err(|e| anyhow::anyhow!("failed to build span exporter: {e}"))?;

    let sampling_rate = config.tracing.as_ref().map_or(1.0, |t| t.sampling_rate);
    let sampler = if sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sampling_rate)
    };

    let sampler = if config.tracing.as_ref().is_none_or(|t| t.parent_based) {
        Sampler::ParentBased(Box::new(sampler))
    } else {
        sampler
    };

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(sampler)
        .with_batch_exporter(exporter)
        .build())
}
