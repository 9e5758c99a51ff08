#!/usr/bin/env cargo
use weather_api::openapi::WeatherApiDoc;

fn main() {
    match serde_json::to_string_pretty(&WeatherApiDoc::openapi()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec to JSON: {e}");
            std::process::exit(1);
        }
    }
}
