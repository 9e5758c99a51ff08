use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use postgres_models::models::weather_query::{
    NewWeatherQuery, WeatherQuery, WeatherQueryChangeset,
};
use uuid::Uuid;

use super::{QueryStore, StoreError, StoreResult, sort_newest_first};

/// Process-local store, used in tests and with `STORAGE_BACKEND=memory`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<Uuid, WeatherQuery>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl QueryStore for MemoryStore {
    async fn create(&self, entry: NewWeatherQuery) -> StoreResult<WeatherQuery> {
        let query = entry.into_weather_query();
        if !query.has_valid_date_range() {
            return Err(StoreError::InvalidDateRange);
        }
        self.inner.write().insert(query.id, query.clone());
        Ok(query)
    }

    async fn list(&self) -> StoreResult<Vec<WeatherQuery>> {
        let mut queries: Vec<WeatherQuery> =
            self.inner.read().values().cloned().collect();
        sort_newest_first(&mut queries);
        Ok(queries)
    }

    async fn get(&self, id: Uuid) -> StoreResult<WeatherQuery> {
        self.inner
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: WeatherQueryChangeset,
    ) -> StoreResult<WeatherQuery> {
        let mut store = self.inner.write();
        let query = store.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let mut updated = query.clone();
        changes.apply_to(&mut updated);
        if !updated.has_valid_date_range() {
            return Err(StoreError::InvalidDateRange);
        }

        *query = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.inner
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
