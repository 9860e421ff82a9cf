use async_trait::async_trait;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    ProviderError,
    error::truncate_body,
    model::{Condition, Coordinates, Temperature, WeatherObservation},
    provider::{http_client, unix_to_utc},
};

use super::WeatherProvider;

const PROVIDER: &str = "openweather";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap client. No `units` parameter is sent, so every temperature
/// comes back in Kelvin.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client()?,
        })
    }

    /// `city` is set only for lookups by name; a 404 there means the city is
    /// unknown, anywhere else it is an ordinary status error.
    async fn get(
        &self,
        path: &str,
        city: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if let (StatusCode::NOT_FOUND, Some(city)) = (status, city) {
            return Err(ProviderError::CityNotFound(city.to_string()));
        }

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    #[serde(default)]
    pressure: u32,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    coord: Option<OwCoord>,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwHistoryEntry {
    dt: i64,
    temp: f64,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    #[serde(default)]
    pressure: u32,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    wind_speed: f64,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwHistoryResponse {
    #[serde(default)]
    timezone_offset: i32,
    #[serde(default)]
    data: Vec<OwHistoryEntry>,
}

fn conditions(weather: Vec<OwWeather>) -> Result<Vec<Condition>, ProviderError> {
    if weather.is_empty() {
        return Err(ProviderError::parse(PROVIDER, "response carried no weather conditions"));
    }

    Ok(weather
        .into_iter()
        .map(|w| Condition { code: w.id, icon: w.icon, description: w.description })
        .collect())
}

fn parse_current(body: &str) -> Result<WeatherObservation, ProviderError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::parse(PROVIDER, e.to_string()))?;

    let observed_at = unix_to_utc(parsed.dt)
        .ok_or_else(|| ProviderError::parse(PROVIDER, format!("invalid timestamp {}", parsed.dt)))?;

    Ok(WeatherObservation {
        city: parsed.name,
        country: parsed.sys.country,
        observed_at,
        utc_offset_secs: parsed.timezone,
        temperature: Temperature::kelvin_value(parsed.main.temp),
        temperature_min: parsed.main.temp_min.map(Temperature::kelvin_value),
        temperature_max: parsed.main.temp_max.map(Temperature::kelvin_value),
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.speed,
        sunrise: parsed.sys.sunrise.and_then(unix_to_utc),
        sunset: parsed.sys.sunset.and_then(unix_to_utc),
        is_day: None,
        conditions: conditions(parsed.weather)?,
        coordinates: parsed.coord.map(|c| Coordinates { lat: c.lat, lon: c.lon }),
    })
}

fn parse_history(
    body: &str,
    today: &WeatherObservation,
) -> Result<Option<WeatherObservation>, ProviderError> {
    let parsed: OwHistoryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::parse(PROVIDER, e.to_string()))?;

    let Some(entry) = parsed.data.into_iter().next() else {
        return Ok(None);
    };

    let observed_at = unix_to_utc(entry.dt)
        .ok_or_else(|| ProviderError::parse(PROVIDER, format!("invalid timestamp {}", entry.dt)))?;

    Ok(Some(WeatherObservation {
        city: today.city.clone(),
        country: today.country.clone(),
        observed_at,
        utc_offset_secs: parsed.timezone_offset,
        temperature: Temperature::kelvin_value(entry.temp),
        temperature_min: None,
        temperature_max: None,
        humidity_pct: entry.humidity,
        pressure_hpa: entry.pressure,
        wind_speed_mps: entry.wind_speed,
        sunrise: entry.sunrise.and_then(unix_to_utc),
        sunset: entry.sunset.and_then(unix_to_utc),
        is_day: None,
        conditions: conditions(entry.weather)?,
        coordinates: today.coordinates,
    }))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherObservation, ProviderError> {
        let body = self
            .get("/data/2.5/weather", Some(city), &[("q", city.to_string())])
            .await?;
        parse_current(&body)
    }

    async fn yesterday(
        &self,
        today: &WeatherObservation,
    ) -> Result<Option<WeatherObservation>, ProviderError> {
        let coords = today
            .coordinates
            .ok_or_else(|| ProviderError::MissingCoordinates(today.city.clone()))?;
        let dt = (today.observed_at - Duration::days(1)).timestamp();

        let body = self
            .get(
                "/data/3.0/onecall/timemachine",
                None,
                &[
                    ("lat", coords.lat.to_string()),
                    ("lon", coords.lon.to_string()),
                    ("dt", dt.to_string()),
                ],
            )
            .await?;

        parse_history(&body, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemperatureUnit;

    const CURRENT: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [
            {"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"},
            {"id": 741, "main": "Fog", "description": "fog", "icon": "50d"}
        ],
        "main": {
            "temp": 289.35, "temp_min": 288.1, "temp_max": 290.4,
            "pressure": 1009, "humidity": 82
        },
        "wind": {"speed": 4.6},
        "dt": 1718201400,
        "sys": {"country": "GB", "sunrise": 1718164000, "sunset": 1718224000},
        "timezone": 3600,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn current_response_is_kelvin_tagged() {
        let obs = parse_current(CURRENT).unwrap();

        assert_eq!(obs.city, "London");
        assert_eq!(obs.country, "GB");
        assert_eq!(obs.temperature.unit, TemperatureUnit::Kelvin);
        assert!((obs.temperature.celsius() - 16.2).abs() < 1e-9);
        assert_eq!(obs.utc_offset_secs, 3600);
        assert_eq!(obs.conditions.len(), 2);
        assert_eq!(obs.conditions[0].icon, "10d");
        assert_eq!(obs.pressure_hpa, 1009);
        assert_eq!(obs.coordinates, Some(Coordinates { lat: 51.5085, lon: -0.1257 }));
    }

    #[test]
    fn current_without_conditions_is_rejected() {
        let body = r#"{"name": "X", "dt": 1, "main": {"temp": 280.0}, "weather": []}"#;
        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[test]
    fn empty_history_is_none() {
        let today = parse_current(CURRENT).unwrap();
        let none = parse_history(r#"{"lat": 51.5, "lon": -0.12, "data": []}"#, &today).unwrap();
        assert!(none.is_none());
    }
}
