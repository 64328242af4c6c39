//! Observability wiring.
//!
//! Every `tracing` span and event emitted by the workspace crates flows through
//! the subscriber installed here: an `EnvFilter` (`RUST_LOG`, default `info`),
//! a text or JSON formatter on stderr, and, when `OTEL_EXPORTER_OTLP_ENDPOINT`
//! is set, an OpenTelemetry OTLP span exporter.
use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogFormat;

const SERVICE_NAME: &str = "claimwatch";
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Keeps the exporter alive; call [`Telemetry::shutdown`] before exit so
/// buffered spans are flushed.
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    pub fn init(format: LogFormat) -> Result<Self> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let provider = if std::env::var_os(OTLP_ENDPOINT_ENV).is_some() {
            Some(otlp_provider()?)
        } else {
            None
        };
        let otel_layer = provider
            .as_ref()
            .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

        let (text_layer, json_layer) = match format {
            LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
            LogFormat::Json => (
                None,
                Some(fmt::layer().json().with_writer(std::io::stderr)),
            ),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(text_layer)
            .with(json_layer)
            .with(otel_layer)
            .try_init()
            .context("install tracing subscriber")?;

        Ok(Self { provider })
    }

    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to flush traces: {err}");
            }
        }
    }
}

fn otlp_provider() -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .context("build OTLP span exporter")?;
    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            SERVICE_NAME,
        )]))
        .build())
}
