use thiserror::Error;

pub type HistoryClientResult<T> = Result<T, HistoryClientError>;

#[derive(Error, Debug)]
pub enum HistoryClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `detail` is the server's message.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl HistoryClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HistoryClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
