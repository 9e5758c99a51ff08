use thiserror::Error;

pub type WeatherClientResult<T> = Result<T, WeatherClientError>;

#[derive(Error, Debug)]
pub enum WeatherClientError {
    #[error("Location must not be empty")]
    EmptyLocation,

    #[error("Could not resolve location: {0}")]
    LocationNotFound(String),

    #[error("{service} did not respond in time")]
    Timeout { service: &'static str },

    #[error("{service} is unavailable: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an unexpected response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl WeatherClientError {
    pub(crate) fn from_transport(
        service: &'static str,
        error: reqwest::Error,
    ) -> Self {
        if error.is_timeout() {
            WeatherClientError::Timeout { service }
        } else if error.is_decode() {
            WeatherClientError::InvalidResponse {
                service,
                message: error.to_string(),
            }
        } else {
            WeatherClientError::Upstream {
                service,
                message: error.to_string(),
            }
        }
    }

    /// Upstream failures, as opposed to problems with the caller's input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            WeatherClientError::Timeout { .. }
                | WeatherClientError::Upstream { .. }
                | WeatherClientError::InvalidResponse { .. }
                | WeatherClientError::Client(_)
        )
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
