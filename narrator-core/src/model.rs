use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Kelvin,
}

/// A temperature reading that always carries the unit it was reported in.
///
/// Conversion happens only through [`Temperature::celsius`], so a Kelvin
/// reading can never be shifted twice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub const fn celsius_value(value: f64) -> Self {
        Self { value, unit: TemperatureUnit::Celsius }
    }

    pub const fn kelvin_value(value: f64) -> Self {
        Self { value, unit: TemperatureUnit::Kelvin }
    }

    pub fn celsius(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => self.value,
            TemperatureUnit::Kelvin => self.value - KELVIN_OFFSET,
        }
    }
}

/// One weather condition as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u16,
    /// Provider icon token, e.g. "01d". OpenWeather suffixes day/night with `d`/`n`.
    pub icon: String,
    /// Free-text description, used when the code has no canned phrase.
    pub description: String,
}

impl Condition {
    /// Day/night hint carried by the icon token, if it has one.
    pub fn icon_daylight(&self) -> Option<bool> {
        match self.icon.chars().last() {
            Some('d') => Some(true),
            Some('n') => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A single observation for one place at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub city: String,
    pub country: String,
    pub observed_at: DateTime<Utc>,
    /// Offset of the city's local time from UTC, in seconds.
    pub utc_offset_secs: i32,
    pub temperature: Temperature,
    pub temperature_min: Option<Temperature>,
    pub temperature_max: Option<Temperature>,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// Explicit day/night flag, for providers that send one.
    pub is_day: Option<bool>,
    /// Source-ordered conditions; providers guarantee at least one.
    pub conditions: Vec<Condition>,
    pub coordinates: Option<Coordinates>,
}

impl WeatherObservation {
    /// Observation time on the city's wall clock.
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix());
        self.observed_at.with_timezone(&offset)
    }

    /// Whether the observation falls in daylight, using whatever the provider gave us:
    /// an explicit flag, then the first icon token, then the sunrise/sunset window.
    pub fn daylight(&self) -> Option<bool> {
        if let Some(is_day) = self.is_day {
            return Some(is_day);
        }

        if let Some(is_day) = self.conditions.first().and_then(Condition::icon_daylight) {
            return Some(is_day);
        }

        match (self.sunrise, self.sunset) {
            (Some(rise), Some(set)) => Some(self.observed_at >= rise && self.observed_at < set),
            _ => None,
        }
    }
}
