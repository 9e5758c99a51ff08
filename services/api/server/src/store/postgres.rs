use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use postgres_models::connection::{
    Pool, WithConnectionError, with_connection, with_transaction,
};
use postgres_models::models::weather_query::{
    NewWeatherQuery, WeatherQuery, WeatherQueryChangeset,
};
use uuid::Uuid;

use super::{QueryStore, StoreError, StoreResult};

/// Writes go to the read-write pool, reads to the read-only pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Pool,
    read_only_pool: Pool,
}

impl PostgresStore {
    pub fn new(pool: Pool, read_only_pool: Pool) -> Self {
        Self {
            pool,
            read_only_pool,
        }
    }
}

fn flatten<E: Into<StoreError>>(e: WithConnectionError<E>) -> StoreError {
    match e {
        WithConnectionError::Pool(e) => StoreError::Pool(e.to_string()),
        WithConnectionError::Operation(e) => e.into(),
    }
}

#[async_trait]
impl QueryStore for PostgresStore {
    async fn create(&self, entry: NewWeatherQuery) -> StoreResult<WeatherQuery> {
        if !postgres_models::models::weather_query::is_valid_date_range(
            entry.start_date,
            entry.end_date,
        ) {
            return Err(StoreError::InvalidDateRange);
        }

        with_connection(&self.pool, |mut conn| async move {
            WeatherQuery::create(entry, &mut conn).await
        })
        .await
        .map_err(flatten)
    }

    async fn list(&self) -> StoreResult<Vec<WeatherQuery>> {
        with_connection(&self.read_only_pool, |mut conn| async move {
            WeatherQuery::list_recent(&mut conn).await
        })
        .await
        .map_err(flatten)
    }

    async fn get(&self, id: Uuid) -> StoreResult<WeatherQuery> {
        with_connection(&self.read_only_pool, |mut conn| async move {
            WeatherQuery::find(id, &mut conn).await
        })
        .await
        .map_err(flatten)?
        .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: WeatherQueryChangeset,
    ) -> StoreResult<WeatherQuery> {
        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let mut merged = WeatherQuery::find_for_update(id, conn)
                    .await?
                    .ok_or(StoreError::NotFound(id))?;

                changes.apply_to(&mut merged);
                if !merged.has_valid_date_range() {
                    return Err(StoreError::InvalidDateRange);
                }
                if changes.is_empty() {
                    return Ok(merged);
                }

                Ok(WeatherQuery::update(id, &changes, conn).await?)
            })
        })
        .await
        .map_err(flatten)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let deleted = with_connection(&self.pool, |mut conn| async move {
            WeatherQuery::delete(id, &mut conn).await
        })
        .await
        .map_err(flatten)?;

        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        with_connection(&self.pool, |mut conn| async move {
            diesel::sql_query("SELECT 1").execute(&mut conn).await
        })
        .await
        .map(|_| ())
        .map_err(flatten)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
