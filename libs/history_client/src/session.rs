use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use weather_client::WeatherReport;

use crate::client::HistoryClient;
use crate::error::HistoryClientResult;
use crate::models::{CreateQueryRequest, QueryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out increasing tickets; only the most recent one is current.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: AtomicU64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    /// The response belonged to the latest search and is now displayed.
    Applied(T),
    /// A newer search was issued while this one was in flight.
    Superseded,
}

/// Runs overlapping searches and keeps the report of the latest one.
///
/// A failed search returns its error and leaves the displayed report as it
/// was.
#[derive(Debug)]
pub struct SearchSession {
    client: Arc<HistoryClient>,
    sequencer: SearchSequencer,
    current: Mutex<Option<WeatherReport>>,
}

impl SearchSession {
    pub fn new(client: Arc<HistoryClient>) -> Self {
        Self {
            client,
            sequencer: SearchSequencer::new(),
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<WeatherReport> {
        self.current.lock().clone()
    }

    /// Live lookup, nothing is stored server side.
    pub async fn search(
        &self,
        location: &str,
    ) -> HistoryClientResult<SearchOutcome<WeatherReport>> {
        let ticket = self.sequencer.issue();
        let report = self.client.live_weather(location).await?;
        Ok(self.apply(ticket, report.clone(), report))
    }

    /// Lookup that is also saved to history.
    pub async fn search_and_save(
        &self,
        request: &CreateQueryRequest,
    ) -> HistoryClientResult<SearchOutcome<QueryRecord>> {
        let ticket = self.sequencer.issue();
        let record = self.client.create_query(request).await?;
        Ok(self.apply(ticket, record.weather_result.clone(), record))
    }

    fn apply<T>(&self, ticket: SearchTicket, report: WeatherReport, value: T) -> SearchOutcome<T> {
        let mut current = self.current.lock();
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(ticket = ticket.value(), "discarding stale search response");
            return SearchOutcome::Superseded;
        }
        *current = Some(report);
        SearchOutcome::Applied(value)
    }
}
