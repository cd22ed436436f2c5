//! Open-Meteo client: geocode the user's city, then fetch current conditions
//! and today's range. Plan generation treats failures as "weather
//! unavailable" rather than aborting.

use serde::Serialize;
use thiserror::Error;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("city not found: {0}")]
    CityNotFound(String),
    #[error("no city configured in preferences")]
    NoCity,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub condition: String,
    pub temperature_c: f64,
    pub high_c: f64,
    pub low_c: f64,
    pub precipitation_chance: i64,
}

impl WeatherReport {
    /// One-line rendering for prompt embedding.
    pub fn summary(&self) -> String {
        format!(
            "{} in {}, currently {:.0}°C (high {:.0}°C / low {:.0}°C), {}% chance of precipitation",
            self.condition,
            self.city,
            self.temperature_c,
            self.high_c,
            self.low_c,
            self.precipitation_chance
        )
    }
}

#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
        }
    }

    pub async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::NoCity);
        }

        let geo: serde_json::Value = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let place = geo["results"]
            .get(0)
            .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))?;
        let latitude = place["latitude"].as_f64().unwrap_or_default();
        let longitude = place["longitude"].as_f64().unwrap_or_default();
        let resolved_name = place["name"].as_str().unwrap_or(city).to_string();

        let forecast: serde_json::Value = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,precipitation_probability_max"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let code = forecast["current"]["weather_code"].as_i64().unwrap_or(-1);
        Ok(WeatherReport {
            city: resolved_name,
            condition: describe_weather_code(code).to_string(),
            temperature_c: forecast["current"]["temperature_2m"].as_f64().unwrap_or_default(),
            high_c: forecast["daily"]["temperature_2m_max"][0].as_f64().unwrap_or_default(),
            low_c: forecast["daily"]["temperature_2m_min"][0].as_f64().unwrap_or_default(),
            precipitation_chance: forecast["daily"]["precipitation_probability_max"][0]
                .as_i64()
                .unwrap_or_default(),
        })
    }
}

/// WMO weather interpretation codes, collapsed to what a planner cares about.
fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1..=3 => "partly cloudy",
        45 | 48 => "foggy",
        51..=57 => "drizzle",
        61..=67 => "rain",
        71..=77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95..=99 => "thunderstorm",
        _ => "unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_codes_map_to_readable_conditions() {
        assert_eq!(describe_weather_code(0), "clear sky");
        assert_eq!(describe_weather_code(63), "rain");
        assert_eq!(describe_weather_code(96), "thunderstorm");
        assert_eq!(describe_weather_code(-1), "unknown conditions");
    }

    #[test]
    fn summary_reads_naturally() {
        let report = WeatherReport {
            city: "Oslo".to_string(),
            condition: "rain".to_string(),
            temperature_c: 11.4,
            high_c: 13.0,
            low_c: 7.6,
            precipitation_chance: 80,
        };
        assert_eq!(
            report.summary(),
            "rain in Oslo, currently 11°C (high 13°C / low 8°C), 80% chance of precipitation"
        );
    }
}
