//! Turns raw observations into a display-ready narrative.
//!
//! Everything here is synchronous and pure: callers fetch the observations,
//! this module only describes them.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Temperature, WeatherObservation};

pub mod compare;
pub mod compose;
pub mod condition;
pub mod framing;

pub use compare::{Band, BandEdges, compare};
pub use compose::compose;
pub use condition::classify;
pub use framing::{FramingPolicy, PhrasePair, TimeSignal, frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NarrativeOptions {
    #[serde(default)]
    pub framing: FramingPolicy,
    #[serde(default)]
    pub bands: BandEdges,
}

/// Display-ready description of one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub city: String,
    pub country: String,
    /// Whole degrees Celsius.
    pub temperature: i64,
    pub temperature_min: Option<i64>,
    pub temperature_max: Option<i64>,
    pub description: String,
    /// Empty when yesterday's observation was unavailable.
    pub comparison: String,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub observed_at: DateTime<Utc>,
    pub icon: Option<String>,
}

/// Round half up: 15.5 -> 16, -0.5 -> 0.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn display_degrees(temperature: Temperature) -> i64 {
    round_half_up(temperature.celsius())
}

/// Time signal for `observation` under `policy`. Each policy falls back to the
/// other when its own signal is missing, so a signal is always produced.
pub fn time_signal(observation: &WeatherObservation, policy: FramingPolicy) -> TimeSignal {
    let hour = TimeSignal::Hour(observation.local_time().hour());
    match policy {
        FramingPolicy::HourOfDay => hour,
        FramingPolicy::DayNight => {
            observation.daylight().map(TimeSignal::Daylight).unwrap_or(hour)
        }
    }
}

/// Joined description of every condition on `observation`, in source order.
pub fn describe(observation: &WeatherObservation) -> String {
    let phrases: Vec<&str> = observation
        .conditions
        .iter()
        .map(|condition| classify(condition.code, &condition.description))
        .collect();

    compose(&phrases)
}

pub fn assemble(
    today: &WeatherObservation,
    yesterday: Option<&WeatherObservation>,
    options: &NarrativeOptions,
) -> Narrative {
    let comparison = match yesterday {
        Some(previous) => {
            let phrases = frame(time_signal(today, options.framing));
            compare(today.temperature, Some(previous.temperature), phrases, options.bands)
        }
        None => String::new(),
    };

    Narrative {
        city: today.city.clone(),
        country: today.country.clone(),
        temperature: display_degrees(today.temperature),
        temperature_min: today.temperature_min.map(display_degrees),
        temperature_max: today.temperature_max.map(display_degrees),
        description: describe(today),
        comparison,
        humidity_pct: today.humidity_pct,
        pressure_hpa: today.pressure_hpa,
        wind_speed_mps: today.wind_speed_mps,
        sunrise: today.sunrise,
        sunset: today.sunset,
        observed_at: today.observed_at,
        icon: today.conditions.first().map(|c| c.icon.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::observation;
    use chrono::TimeZone;

    fn at_local_hour(mut obs: WeatherObservation, hour: u32) -> WeatherObservation {
        obs.utc_offset_secs = 0;
        obs.observed_at = Utc.with_ymd_and_hms(2024, 6, 12, hour, 30, 0).unwrap();
        obs
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(15.5), 16);
        assert_eq!(round_half_up(15.49), 15);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn displayed_temperature_uses_celsius() {
        let today = observation(Temperature::celsius_value(15.5), &[800]);
        assert_eq!(assemble(&today, None, &NarrativeOptions::default()).temperature, 16);

        let today = observation(Temperature::celsius_value(15.49), &[800]);
        assert_eq!(assemble(&today, None, &NarrativeOptions::default()).temperature, 15);

        let today = observation(Temperature::kelvin_value(289.0), &[800]);
        assert_eq!(assemble(&today, None, &NarrativeOptions::default()).temperature, 16);
    }

    #[test]
    fn missing_yesterday_leaves_comparison_empty() {
        let mut today = observation(Temperature::celsius_value(21.3), &[500, 741]);
        today.conditions[0].description = "light rain".into();
        today.temperature_min = Some(Temperature::celsius_value(18.6));
        today.temperature_max = Some(Temperature::celsius_value(23.5));

        let narrative = assemble(&today, None, &NarrativeOptions::default());

        assert_eq!(narrative.comparison, "");
        assert_eq!(narrative.description, "light rain and fog");
        assert_eq!(narrative.city, "Wellington");
        assert_eq!(narrative.country, "NZ");
        assert_eq!(narrative.temperature, 21);
        assert_eq!(narrative.temperature_min, Some(19));
        assert_eq!(narrative.temperature_max, Some(24));
        assert_eq!(narrative.humidity_pct, 70);
        assert_eq!(narrative.pressure_hpa, 1012);
    }

    #[test]
    fn afternoon_end_to_end_with_tight_bands() {
        let today = at_local_hour(observation(Temperature::celsius_value(16.2), &[800]), 14);
        let yesterday = observation(Temperature::celsius_value(10.0), &[800]);

        let narrative = assemble(&today, Some(&yesterday), &NarrativeOptions::default());

        assert_eq!(narrative.description, "clear skies");
        assert_eq!(narrative.temperature, 16);
        assert_eq!(narrative.comparison, "This afternoon is much warmer than yesterday.");
    }

    #[test]
    fn afternoon_end_to_end_with_wide_bands() {
        let today = at_local_hour(observation(Temperature::celsius_value(16.2), &[800]), 14);
        let yesterday = observation(Temperature::celsius_value(10.0), &[800]);
        let options = NarrativeOptions { bands: BandEdges::Wide, ..NarrativeOptions::default() };

        let narrative = assemble(&today, Some(&yesterday), &options);

        assert_eq!(narrative.comparison, "This afternoon is warmer than yesterday.");
    }

    #[test]
    fn hour_comes_from_city_local_time() {
        // 02:00 UTC in a UTC+13 city is 15:00 local.
        let today = observation(Temperature::celsius_value(10.0), &[804]);
        let yesterday = observation(Temperature::kelvin_value(283.15), &[804]);

        let narrative = assemble(&today, Some(&yesterday), &NarrativeOptions::default());

        assert_eq!(
            narrative.comparison,
            "This afternoon's temperature is similar to yesterday."
        );
    }

    #[test]
    fn day_night_policy_uses_icon_token() {
        let mut today = at_local_hour(observation(Temperature::celsius_value(8.0), &[801]), 14);
        today.conditions[0].icon = "02n".into();
        let yesterday = observation(Temperature::celsius_value(12.0), &[801]);
        let options =
            NarrativeOptions { framing: FramingPolicy::DayNight, ..NarrativeOptions::default() };

        let narrative = assemble(&today, Some(&yesterday), &options);

        assert_eq!(narrative.comparison, "Tonight is cooler than last night.");
    }

    #[test]
    fn day_night_policy_degrades_to_hour_without_a_flag() {
        let today = at_local_hour(observation(Temperature::celsius_value(8.0), &[801]), 19);
        assert_eq!(time_signal(&today, FramingPolicy::DayNight), TimeSignal::Hour(19));
    }
}
