use anyhow::Result;
use tracing::{info, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, Layer};
use tracing_subscriber::{registry, EnvFilter};

#[cfg(any(feature = "telemetry-grpc", feature = "telemetry-http"))]
pub fn build_otel_layer<S>(
) -> Result<tracing_opentelemetry::OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    use init_tracing_opentelemetry::{init_propagator, otlp, resource::DetectResource};
    use opentelemetry::global;
    use opentelemetry::trace::TracerProvider;

    let otel_rsrc = DetectResource::default()
        .with_fallback_service_name(env!("CARGO_PKG_NAME"))
        .with_fallback_service_version(env!("CARGO_PKG_VERSION"))
        .build();
    let tracerprovider = otlp::traces::init_tracerprovider(otel_rsrc, otlp::traces::identity)?;
    init_propagator()?;
    let layer = tracing_opentelemetry::layer()
        .with_error_records_to_exceptions(true)
        .with_tracer(tracerprovider.tracer(""));
    global::set_tracer_provider(tracerprovider);
    Ok(layer)
}

pub fn build_reduced_logger_text<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if cfg!(debug_assertions) {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_line_number(false)
                .with_thread_names(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
                .event_format(tracing_subscriber::fmt::format().compact()),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::SystemTime)
                .with_target(true),
        )
    }
}

pub fn build_loglevel_filter_layer() -> EnvFilter {
    // `otel::tracing` should be a level info to emit opentelemetry trace & span
    std::env::set_var(
        "RUST_LOG",
        format!(
            "{},otel::tracing=trace,otel=debug,axum_tracing_opentelemetry=error",
            std::env::var("RUST_LOG")
                .or_else(|_| std::env::var("OTEL_LOG_LEVEL"))
                .unwrap_or_else(|_| "warn".to_string())
        ),
    );
    EnvFilter::from_default_env()
}

/// `settings` is the comma separated `telemetry` config value, e.g. `traces`.
pub fn init_telemetry_and_tracing(settings: &Option<String>) -> Result<()> {
    // Temporary subscriber to log output during setup
    let subscriber = registry()
        .with(build_loglevel_filter_layer())
        .with(build_reduced_logger_text());
    let _guard = tracing::subscriber::set_default(subscriber);
    info!("init logging & tracing");

    let tracing_enabled = settings
        .as_ref()
        .map(|settings| settings.to_lowercase().split(',').any(|s| s == "traces"))
        .unwrap_or(false);

    #[cfg(any(feature = "telemetry-grpc", feature = "telemetry-http"))]
    if tracing_enabled {
        let subscriber = registry()
            .with(build_otel_layer()?)
            .with(build_loglevel_filter_layer())
            .with(build_reduced_logger_text());
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    }

    #[cfg(not(any(feature = "telemetry-grpc", feature = "telemetry-http")))]
    if tracing_enabled {
        tracing::warn!("Traces requested, but shoutbox was built without a telemetry feature");
    }

    let subscriber = registry()
        .with(build_loglevel_filter_layer())
        .with(build_reduced_logger_text());
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
