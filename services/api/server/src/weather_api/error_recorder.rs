use std::sync::Arc;

use telemetry::metrics::Telemetry;
use uuid::Uuid;

use crate::metrics::ServerMetrics;
use crate::weather_api::api_error::ApiV1Error;

/// Handler error types that can be converted to [`ApiV1Error`].
pub trait IntoApiV1Error {
    /// Label for the `error_code` metric dimension.
    fn error_code(&self) -> &'static str;

    fn into_api_v1_error(self, request_id: &Uuid) -> ApiV1Error;
}

/// Counts an error in `request_errors` and converts it to [`ApiV1Error`].
pub struct ErrorRecorder<'a> {
    telemetry: &'a Arc<Telemetry<ServerMetrics>>,
    handler_name: &'a str,
    request_id: &'a Uuid,
}

impl<'a> ErrorRecorder<'a> {
    pub fn new(
        telemetry: &'a Arc<Telemetry<ServerMetrics>>,
        handler_name: &'a str,
        request_id: &'a Uuid,
    ) -> Self {
        Self {
            telemetry,
            handler_name,
            request_id,
        }
    }

    pub fn record<E: IntoApiV1Error + std::fmt::Display>(&self, e: E) -> ApiV1Error {
        let code = e.error_code();
        self.telemetry.maybe_use_metrics(|m| {
            m.record_error(self.handler_name, code);
        });
        tracing::warn!(
            handler = self.handler_name,
            error_code = code,
            request_id = %self.request_id,
            error = %e,
            "request failed"
        );
        e.into_api_v1_error(self.request_id)
    }
}
