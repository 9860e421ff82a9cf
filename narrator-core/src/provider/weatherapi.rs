use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
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

const PROVIDER: &str = "weatherapi";
const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";
/// WeatherAPI.com error code for "No location found matching parameter 'q'".
const NO_LOCATION_FOUND: u32 = 1006;

/// WeatherAPI.com client. Temperatures are reported in Celsius and every
/// reading carries an explicit `is_day` flag.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
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

    async fn get(
        &self,
        path: &str,
        city: &str,
        extra: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, city, "requesting WeatherAPI");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let api_code = serde_json::from_str::<WaErrorResponse>(&body).ok().map(|e| e.error.code);
        if status == StatusCode::NOT_FOUND
            || (status == StatusCode::BAD_REQUEST && api_code == Some(NO_LOCATION_FOUND))
        {
            return Err(ProviderError::CityNotFound(city.to_string()));
        }

        Err(ProviderError::Status {
            provider: PROVIDER,
            status: status.as_u16(),
            body: truncate_body(&body),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorBody,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    country: String,
    lat: Option<f64>,
    lon: Option<f64>,
    localtime_epoch: Option<i64>,
    /// "2024-06-12 15:30", the city's wall clock.
    localtime: Option<String>,
}

impl WaLocation {
    /// UTC offset derived from the local wall-clock string and its epoch,
    /// rounded to the nearest quarter hour.
    fn utc_offset_secs(&self) -> i32 {
        let (Some(epoch), Some(local)) = (self.localtime_epoch, self.localtime.as_deref()) else {
            return 0;
        };
        let Ok(local) = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M") else {
            return 0;
        };
        let Some(utc) = DateTime::<Utc>::from_timestamp(epoch, 0) else {
            return 0;
        };

        const QUARTER_HOUR: i64 = 15 * 60;
        let diff = (local - utc.naive_utc()).num_seconds();
        let rounded = ((diff as f64) / QUARTER_HOUR as f64).round() as i64 * QUARTER_HOUR;
        i32::try_from(rounded).unwrap_or(0)
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates { lat: self.lat?, lon: self.lon? })
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
    code: u16,
}

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition { code: c.code, icon: c.icon, description: c.text.to_lowercase() }
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated_epoch: Option<i64>,
    temp_c: f64,
    is_day: Option<u8>,
    condition: WaCondition,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    pressure_mb: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time_epoch: i64,
    temp_c: f64,
    is_day: Option<u8>,
    condition: WaCondition,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    pressure_mb: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    #[serde(default)]
    hour: Vec<WaHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaHistoryResponse {
    forecast: WaForecast,
}

fn kph_to_mps(kph: f64) -> f64 {
    kph / 3.6
}

fn parse_current(body: &str) -> Result<WeatherObservation, ProviderError> {
    let parsed: WaResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::parse(PROVIDER, e.to_string()))?;

    let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
    let observed_at = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

    Ok(WeatherObservation {
        utc_offset_secs: parsed.location.utc_offset_secs(),
        coordinates: parsed.location.coordinates(),
        city: parsed.location.name,
        country: parsed.location.country,
        observed_at,
        temperature: Temperature::celsius_value(parsed.current.temp_c),
        temperature_min: None,
        temperature_max: None,
        humidity_pct: parsed.current.humidity,
        pressure_hpa: parsed.current.pressure_mb.round() as u32,
        wind_speed_mps: kph_to_mps(parsed.current.wind_kph),
        sunrise: None,
        sunset: None,
        is_day: parsed.current.is_day.map(|flag| flag == 1),
        conditions: vec![parsed.current.condition.into()],
    })
}

fn parse_history(
    body: &str,
    today: &WeatherObservation,
    target: DateTime<Utc>,
) -> Result<Option<WeatherObservation>, ProviderError> {
    let parsed: WaHistoryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::parse(PROVIDER, e.to_string()))?;

    let target_ts = target.timestamp();
    let closest = parsed
        .forecast
        .forecastday
        .into_iter()
        .flat_map(|day| day.hour)
        .min_by_key(|h| (h.time_epoch - target_ts).abs());

    let Some(hour) = closest else {
        return Ok(None);
    };

    let observed_at = unix_to_utc(hour.time_epoch).ok_or_else(|| {
        ProviderError::parse(PROVIDER, format!("invalid timestamp {}", hour.time_epoch))
    })?;

    Ok(Some(WeatherObservation {
        city: today.city.clone(),
        country: today.country.clone(),
        observed_at,
        utc_offset_secs: today.utc_offset_secs,
        temperature: Temperature::celsius_value(hour.temp_c),
        temperature_min: None,
        temperature_max: None,
        humidity_pct: hour.humidity,
        pressure_hpa: hour.pressure_mb.round() as u32,
        wind_speed_mps: kph_to_mps(hour.wind_kph),
        sunrise: None,
        sunset: None,
        is_day: hour.is_day.map(|flag| flag == 1),
        conditions: vec![hour.condition.into()],
        coordinates: today.coordinates,
    }))
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherObservation, ProviderError> {
        let body = self.get("/v1/current.json", city, &[]).await?;
        parse_current(&body)
    }

    async fn yesterday(
        &self,
        today: &WeatherObservation,
    ) -> Result<Option<WeatherObservation>, ProviderError> {
        let target = today.observed_at - Duration::days(1);
        let local_date = (today.local_time() - Duration::days(1)).date_naive();

        let body = self
            .get(
                "/v1/history.json",
                &today.city,
                &[("dt", local_date.format("%Y-%m-%d").to_string())],
            )
            .await?;

        parse_history(&body, today, target)
    }
}
