use prometheus::{Encoder, Registry, TextEncoder};
use rand::Rng;
use rand::distr::Alphanumeric;

/// A set of service metrics living in its own prometheus registry.
pub trait TelemetryMetrics: Clone + Send + Sync + 'static {
    fn registry(&self) -> &Registry;

    fn metrics(&self) -> Option<Self>;

    /// Text exposition of everything registered in [`Self::registry`].
    fn gather_metrics(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) =
            TextEncoder::new().encode(&self.registry().gather(), &mut buffer)
        {
            tracing::error!("could not encode service metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Registry prefix that cannot collide with another instance, for tests
    /// that build several metric sets in one process.
    fn generate_random_prefix() -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("t{suffix}")
    }
}
