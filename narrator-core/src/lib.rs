//! Core library for the `narrator` weather front end.
//!
//! This crate defines:
//! - The narrative engine: condition phrases, list joining, day/night framing,
//!   day-over-day temperature comparison
//! - Shared domain models (observations, unit-tagged temperatures)
//! - Abstraction over weather providers
//! - Configuration & credentials handling
//!
//! It is used by `narrator-web`, but the narrative engine has no I/O and can be
//! driven directly from tests or other binaries.

pub mod config;
pub mod error;
pub mod model;
pub mod narrative;
pub mod provider;

pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::ProviderError;
pub use model::{Condition, Coordinates, Temperature, TemperatureUnit, WeatherObservation};
pub use narrative::{Narrative, NarrativeOptions, assemble};
pub use provider::{ProviderId, WeatherProvider};

/// Fetches today's observation and, best effort, yesterday's, then assembles
/// the narrative. Yesterday failures are logged and leave the comparison empty.
pub async fn narrate(
    provider: &dyn WeatherProvider,
    city: &str,
    options: &NarrativeOptions,
) -> Result<Narrative, ProviderError> {
    let today = provider.current(city).await?;

    let yesterday = match provider.yesterday(&today).await {
        Ok(Some(observation)) => Some(observation),
        Ok(None) => {
            tracing::warn!(city = %today.city, "no historical observation for yesterday");
            None
        }
        Err(err) => {
            tracing::warn!(city = %today.city, error = %err, "failed to fetch yesterday's weather");
            None
        }
    };

    Ok(assemble(&today, yesterday.as_ref(), options))
}
