//! Persistence for weather queries, behind a trait so the service can run on
//! PostgreSQL or entirely in memory.

use async_trait::async_trait;
use postgres_models::models::weather_query::{
    NewWeatherQuery, WeatherQuery, WeatherQueryChangeset,
};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Weather query {0} not found")]
    NotFound(Uuid),

    #[error("start_date must be on or before end_date")]
    InvalidDateRange,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Failed to get database connection: {0}")]
    Pool(String),
}

#[async_trait]
pub trait QueryStore: Send + Sync + std::fmt::Debug {
    async fn create(&self, entry: NewWeatherQuery) -> StoreResult<WeatherQuery>;

    /// Newest first: `created_at` descending, then `id` descending.
    async fn list(&self) -> StoreResult<Vec<WeatherQuery>>;

    async fn get(&self, id: Uuid) -> StoreResult<WeatherQuery>;

    /// Applies `changes` and checks the merged date range in one atomic step.
    async fn update(
        &self,
        id: Uuid,
        changes: WeatherQueryChangeset,
    ) -> StoreResult<WeatherQuery>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;

    fn backend(&self) -> &'static str;
}

/// Ordering shared by every backend's list.
pub(crate) fn sort_newest_first(queries: &mut [WeatherQuery]) {
    queries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
