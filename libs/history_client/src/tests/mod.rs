mod client_tests;
mod session_tests;

use serde_json::{Value, json};

pub(crate) fn report_json(name: &str, temp: f64) -> Value {
    json!({
        "location": { "lat": 48.8566, "lon": 2.3522, "display_name": name },
        "current": {
            "name": name,
            "dt": 1_748_779_200,
            "timezone": 7200,
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "main": {
                "temp": temp, "feels_like": temp, "temp_min": temp,
                "temp_max": temp, "humidity": 40, "pressure": 1015
            },
            "wind": { "speed": 3.1 },
            "sys": { "sunrise": 1_748_749_000, "sunset": 1_748_806_000 },
            "clouds": { "all": 0 }
        },
        "forecast": {
            "list": [{ "dt": 1_748_790_000, "main": { "temp": temp, "temp_min": temp, "temp_max": temp } }]
        }
    })
}

pub(crate) fn record_json(id: &str, location: &str, temp: f64) -> Value {
    json!({
        "id": id,
        "location_input": location,
        "resolved_location": format!("{location}, France"),
        "start_date": "2025-06-01",
        "end_date": null,
        "weather_result": report_json(location, temp),
        "created_at": "2025-06-01T12:00:00Z"
    })
}
