//! Optional tracing/OpenTelemetry wiring (feature `otel`).
//!
//! - IMAGE_PROBE_OTEL=1: export spans through the OpenTelemetry stdout exporter.
//! - IMAGE_PROBE_TRACING_FMT=1: human-readable tracing events on stderr, filtered by
//!   RUST_LOG (default "warn").
//! Neither set: no subscriber is installed and instrumentation is a no-op.

use std::env;

use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::prelude::*;

pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

static INIT: OnceCell<()> = OnceCell::new();

fn env_flag(name: &str) -> bool {
    env::var(name).ok().as_deref() == Some("1")
}

fn build_resource() -> Resource {
    let service_name = env::var("OTEL_SERVICE_NAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "image-probe".to_string());

    let mut attrs = vec![
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("process.pid", std::process::id() as i64),
    ];
    if let Ok(host) = hostname::get() {
        if let Ok(s) = host.into_string() {
            attrs.push(KeyValue::new("host.name", s));
        }
    }

    Resource::builder()
        .with_service_name(service_name)
        .with_attributes(attrs)
        .build()
}

pub fn telemetry_init() -> Option<TelemetryGuard> {
    if INIT.get().is_some() {
        return None;
    }

    let use_otel = env_flag("IMAGE_PROBE_OTEL");
    let use_fmt = env_flag("IMAGE_PROBE_TRACING_FMT");
    if !use_otel && !use_fmt {
        return None;
    }

    let provider = if use_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .with_resource(build_resource())
            .build();
        opentelemetry::global::set_tracer_provider(provider.clone());
        Some(provider)
    } else {
        None
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("image-probe")));

    // RUST_LOG only filters the stderr layer; exported spans are not filtered.
    let fmt_layer = if use_fmt {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
    } else {
        None
    };

    let init = tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
    if init.is_err() {
        eprintln!("image-probe: telemetry init skipped (global subscriber already set)");
        return None;
    }

    let _ = INIT.set(());
    Some(TelemetryGuard { provider })
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            let _ = provider.shutdown();
        }
    }
}
