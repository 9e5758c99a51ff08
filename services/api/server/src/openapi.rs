use utoipa::OpenApi;

/// OpenAPI document for everything under `/api`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::weather_api::core::banner,
        crate::health::handler,
        crate::weather_api::core::weather::live::handler::handler,
        crate::weather_api::core::weather::forecast::handler::handler,
        crate::weather_api::core::weather::query::handler::create,
        crate::weather_api::core::weather::query::handler::list,
        crate::weather_api::core::weather::query::handler::get,
        crate::weather_api::core::weather::query::handler::update,
        crate::weather_api::core::weather::query::handler::delete,
        crate::weather_api::core::export::handler::handler,
    ),
    info(
        title = "Weather History API",
        version = "1.0.0",
        description = "Live weather lookups, a saved search history and exports of that history",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "/api", description = "Weather API")
    ),
    tags(
        (name = "weather", description = "Live lookups that are not saved"),
        (name = "history", description = "Saved weather queries and exports"),
        (name = "service", description = "Banner and health")
    )
)]
pub struct WeatherApiDoc;

impl WeatherApiDoc {
    pub fn openapi() -> utoipa::openapi::OpenApi {
        <WeatherApiDoc as utoipa::OpenApi>::openapi()
    }

    /// The document as JSON with `type: ["array", "null"]` rewritten to
    /// `type: "array", nullable: true` for OpenAPI 3.0 consumers.
    pub fn openapi_json() -> serde_json::Value {
        let mut json_value = match serde_json::to_value(Self::openapi()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize OpenAPI spec: {e}");
                return serde_json::Value::Null;
            }
        };

        let fixed_count = Self::fix_nullable_arrays_recursive(&mut json_value);
        if fixed_count > 0 {
            tracing::debug!(
                "Fixed {} nullable array type definitions in OpenAPI spec",
                fixed_count
            );
        }

        json_value
    }

    fn fix_nullable_arrays_recursive(value: &mut serde_json::Value) -> usize {
        let mut fixed_count = 0;

        match value {
            serde_json::Value::Object(map) => {
                if let Some(type_value) = map.get("type")
                    && let serde_json::Value::Array(type_array) = type_value
                {
                    let has_array = type_array.iter().any(|v| v == "array");
                    let has_null = type_array.iter().any(|v| v == "null");

                    if has_array && has_null && type_array.len() == 2 {
                        map.insert(
                            "type".to_string(),
                            serde_json::Value::String("array".to_string()),
                        );
                        map.insert(
                            "nullable".to_string(),
                            serde_json::Value::Bool(true),
                        );
                        fixed_count += 1;
                    }
                }

                for (_key, val) in map.iter_mut() {
                    fixed_count += Self::fix_nullable_arrays_recursive(val);
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    fixed_count += Self::fix_nullable_arrays_recursive(item);
                }
            }
            _ => {}
        }

        fixed_count
    }
}
