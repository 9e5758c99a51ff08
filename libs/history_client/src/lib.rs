//! Client side of the weather history API: typed calls for every endpoint
//! and sequencing for overlapping searches.

pub mod client;
pub mod error;
pub mod models;
pub mod session;

#[cfg(test)]
mod tests;

pub use client::HistoryClient;
pub use error::{HistoryClientError, HistoryClientResult};
pub use models::{CreateQueryRequest, ExportedFile, QueryRecord, UpdateQueryRequest};
pub use session::{SearchOutcome, SearchSequencer, SearchSession, SearchTicket};
