use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, serde::Serialize)]
#[diesel(table_name = crate::schema::weather_queries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WeatherQuery {
    pub id: Uuid,
    pub location_input: String,
    pub resolved_location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weather_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::weather_queries)]
pub struct NewWeatherQuery {
    pub id: Uuid,
    pub location_input: String,
    pub resolved_location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weather_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Editable columns of a stored query.
///
/// `None` leaves a column untouched, `Some(None)` clears a date.
#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::weather_queries)]
pub struct WeatherQueryChangeset {
    pub location_input: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
}

/// Both bounds are optional; when both are set the start must not be after
/// the end.
pub fn is_valid_date_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> bool {
    match (start_date, end_date) {
        (Some(start), Some(end)) => start <= end,
        _ => true,
    }
}

impl NewWeatherQuery {
    pub fn into_weather_query(self) -> WeatherQuery {
        WeatherQuery {
            id: self.id,
            location_input: self.location_input,
            resolved_location: self.resolved_location,
            start_date: self.start_date,
            end_date: self.end_date,
            weather_result: self.weather_result,
            created_at: self.created_at,
        }
    }
}

impl WeatherQueryChangeset {
    pub fn is_empty(&self) -> bool {
        self.location_input.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    pub fn apply_to(&self, query: &mut WeatherQuery) {
        if let Some(location_input) = &self.location_input {
            query.location_input = location_input.clone();
        }
        if let Some(start_date) = self.start_date {
            query.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            query.end_date = end_date;
        }
    }
}

impl WeatherQuery {
    pub fn has_valid_date_range(&self) -> bool {
        is_valid_date_range(self.start_date, self.end_date)
    }

    pub async fn create(
        entry: NewWeatherQuery,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        diesel::insert_into(weather_queries)
            .values(&entry)
            .returning(WeatherQuery::as_returning())
            .get_result(conn)
            .await
    }

    /// All stored queries, newest first.
    pub async fn list_recent(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        weather_queries
            .order((created_at.desc(), id.desc()))
            .select(WeatherQuery::as_select())
            .load(conn)
            .await
    }

    pub async fn find(
        query_id: Uuid,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        weather_queries
            .find(query_id)
            .select(WeatherQuery::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Same as [`WeatherQuery::find`] but locks the row until the surrounding
    /// transaction ends.
    pub async fn find_for_update(
        query_id: Uuid,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        weather_queries
            .find(query_id)
            .select(WeatherQuery::as_select())
            .for_update()
            .first(conn)
            .await
            .optional()
    }

    pub async fn update(
        query_id: Uuid,
        changes: &WeatherQueryChangeset,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        diesel::update(weather_queries.find(query_id))
            .set(changes)
            .returning(WeatherQuery::as_returning())
            .get_result(conn)
            .await
    }

    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete(
        query_id: Uuid,
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::weather_queries::dsl::*;

        diesel::delete(weather_queries.find(query_id))
            .execute(conn)
            .await
    }
}
