mod runtime;
mod system;
mod traits;

use std::{sync::Arc, time::Duration};

pub use traits::TelemetryMetrics;

use parking_lot::RwLock;
use runtime::Runtime;
use system::{System, SystemMetricsWrapper};

#[derive(Clone)]
pub struct Telemetry<M: TelemetryMetrics> {
    runtime: Arc<Runtime>,
    system: Arc<RwLock<System>>,
    metrics: Option<Arc<M>>,
}

impl<M: TelemetryMetrics> Telemetry<M> {
    const DEDICATED_THREADS: usize = 2;
    const REFRESH_INTERVAL: Duration = Duration::from_secs(20);

    pub fn new(metrics: Option<M>) -> Arc<Self> {
        Arc::new(Self {
            runtime: Arc::new(Runtime::new(
                Self::DEDICATED_THREADS,
                Self::REFRESH_INTERVAL,
            )),
            system: Arc::new(RwLock::new(System::new())),
            metrics: metrics.map(Arc::new),
        })
    }

    /// Starts refreshing system gauges in the background.
    pub fn start(&self) -> anyhow::Result<()> {
        let system = Arc::clone(&self.system);
        self.runtime.start(move || {
            system.write().refresh();
        })?;

        Ok(())
    }

    pub fn base_metrics(&self) -> Option<M> {
        self.metrics.as_ref().and_then(|m| m.metrics())
    }

    pub fn maybe_use_metrics<F>(&self, f: F)
    where
        F: Fn(&M),
    {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }

    /// Service metrics, process metrics from the default registry, and
    /// system gauges, in prometheus text format.
    pub fn get_metrics(&self) -> String {
        use prometheus::Encoder;

        let Some(metrics) = &self.metrics else {
            return "# EOF\n".to_string();
        };

        let mut result = metrics.gather_metrics();

        let mut buffer = Vec::new();
        if let Err(e) = prometheus::TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
        {
            tracing::error!("could not encode prometheus metrics: {}", e);
        }
        match String::from_utf8(buffer) {
            Ok(v) => result.push_str(&v),
            Err(e) => tracing::error!(
                "prometheus metrics could not be from_utf8'd: {}",
                e
            ),
        }

        let system_metrics = SystemMetricsWrapper::from(self.system.read().metrics());
        let labels: Vec<(&str, &str)> = vec![];
        match serde_prometheus::to_string(&system_metrics, None, labels) {
            Ok(m) => result.push_str(&m),
            Err(err) => {
                tracing::error!("could not encode system metrics: {:?}", err)
            }
        }

        result.push_str("# EOF\n");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prometheus::{IntCounter, Registry};

    #[derive(Clone)]
    struct TestMetrics {
        registry: Registry,
        hits: IntCounter,
    }

    impl TestMetrics {
        fn new() -> Self {
            let registry = Registry::new_custom(
                Some(Self::generate_random_prefix()),
                None,
            )
            .expect("registry");
            let hits = IntCounter::new("hits", "test counter").expect("counter");
            registry.register(Box::new(hits.clone())).expect("register");
            Self { registry, hits }
        }
    }

    impl TelemetryMetrics for TestMetrics {
        fn registry(&self) -> &Registry {
            &self.registry
        }

        fn metrics(&self) -> Option<Self> {
            Some(self.clone())
        }
    }

    #[test]
    fn without_metrics_only_eof_is_rendered() {
        let telemetry = Telemetry::<TestMetrics>::new(None);
        assert_eq!(telemetry.get_metrics(), "# EOF\n");
    }

    #[test]
    fn service_metrics_are_rendered() {
        let telemetry = Telemetry::new(Some(TestMetrics::new()));
        telemetry.maybe_use_metrics(|m| m.hits.inc());

        let output = telemetry.get_metrics();
        assert!(output.contains("_hits 1"), "output was: {output}");
        assert!(output.ends_with("# EOF\n"));
    }

    #[test]
    fn random_prefixes_are_valid_and_distinct() {
        let a = TestMetrics::generate_random_prefix();
        let b = TestMetrics::generate_random_prefix();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(a.starts_with('t'));
    }
}
