use prometheus::{IntCounterVec, Opts, Registry};
use telemetry::metrics::TelemetryMetrics;

#[derive(Clone, Debug)]
pub struct ServerMetrics {
    pub registry: Registry,

    pub request_errors: IntCounterVec,
    pub weather_lookups: IntCounterVec,
    pub exports: IntCounterVec,
}

impl TelemetryMetrics for ServerMetrics {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn metrics(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ServerMetrics {
    pub fn new_with_random_prefix() -> anyhow::Result<Self> {
        ServerMetrics::new(Some(ServerMetrics::generate_random_prefix()))
    }

    pub fn new(prefix: Option<String>) -> anyhow::Result<Self> {
        let request_errors = IntCounterVec::new(
            Opts::new(
                "request_errors",
                "A metric counting request errors by handler and error code",
            ),
            &["handler", "error_code"],
        )?;

        let weather_lookups = IntCounterVec::new(
            Opts::new(
                "weather_lookups",
                "Live weather lookups by source (cache or upstream) and outcome",
            ),
            &["source", "outcome"],
        )?;

        let exports = IntCounterVec::new(
            Opts::new("exports", "Completed history exports by format"),
            &["format"],
        )?;

        let registry = Registry::new_custom(prefix, None)?;
        registry.register(Box::new(request_errors.clone()))?;
        registry.register(Box::new(weather_lookups.clone()))?;
        registry.register(Box::new(exports.clone()))?;

        Ok(Self {
            registry,
            request_errors,
            weather_lookups,
            exports,
        })
    }

    pub fn record_error(&self, handler: &str, error_code: &str) {
        self.request_errors
            .with_label_values(&[handler, error_code])
            .inc();
    }

    pub fn record_lookup(&self, source: &str, outcome: &str) {
        self.weather_lookups
            .with_label_values(&[source, outcome])
            .inc();
    }

    pub fn record_export(&self, format: &str) {
        self.exports.with_label_values(&[format]).inc();
    }
}
