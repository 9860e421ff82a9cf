use serde::{Deserialize, Serialize};

use super::framing::PhrasePair;
use crate::model::Temperature;

/// Edge set for the seven temperature-change bands, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandEdges {
    /// ±1.0 / ±2.5 / ±5.0
    #[default]
    Tight,
    /// ±1.0 / ±5.0 / ±10.0
    Wide,
}

impl BandEdges {
    /// Inner, middle and outer edge magnitudes.
    pub const fn edges(self) -> (f64, f64, f64) {
        match self {
            BandEdges::Tight => (1.0, 2.5, 5.0),
            BandEdges::Wide => (1.0, 5.0, 10.0),
        }
    }
}

impl std::fmt::Display for BandEdges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BandEdges::Tight => "tight",
            BandEdges::Wide => "wide",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    MuchCooler,
    Cooler,
    SlightlyCooler,
    Similar,
    SlightlyWarmer,
    Warmer,
    MuchWarmer,
}

impl Band {
    /// Band for `delta` (today minus yesterday, °C). Bands are left-closed,
    /// right-open. `None` for NaN.
    pub fn from_delta(delta: f64, edges: BandEdges) -> Option<Self> {
        if delta.is_nan() {
            return None;
        }

        let (inner, middle, outer) = edges.edges();
        let band = if delta < -outer {
            Band::MuchCooler
        } else if delta < -middle {
            Band::Cooler
        } else if delta < -inner {
            Band::SlightlyCooler
        } else if delta < inner {
            Band::Similar
        } else if delta < middle {
            Band::SlightlyWarmer
        } else if delta < outer {
            Band::Warmer
        } else {
            Band::MuchWarmer
        };

        Some(band)
    }

    pub fn adjective(self) -> Option<&'static str> {
        match self {
            Band::MuchCooler => Some("much cooler"),
            Band::Cooler => Some("cooler"),
            Band::SlightlyCooler => Some("slightly cooler"),
            Band::Similar => None,
            Band::SlightlyWarmer => Some("slightly warmer"),
            Band::Warmer => Some("warmer"),
            Band::MuchWarmer => Some("much warmer"),
        }
    }

    pub fn sentence(self, phrases: PhrasePair) -> String {
        match self.adjective() {
            Some(adjective) => {
                format!("{} is {adjective} than {}.", phrases.subject, phrases.reference)
            }
            None => format!(
                "{}'s temperature is similar to {}.",
                phrases.subject, phrases.reference
            ),
        }
    }
}

/// Rounds a delta to a millionth of a degree so readings given in hundredths
/// land exactly on the band edges.
fn snap(delta: f64) -> f64 {
    (delta * 1e6).round() / 1e6
}

/// Sentence comparing today with yesterday, or an empty string when there is
/// nothing to compare against.
pub fn compare(
    today: Temperature,
    yesterday: Option<Temperature>,
    phrases: PhrasePair,
    edges: BandEdges,
) -> String {
    let Some(yesterday) = yesterday else {
        return String::new();
    };

    let delta = if today.unit == yesterday.unit {
        today.value - yesterday.value
    } else {
        today.celsius() - yesterday.celsius()
    };
    if !delta.is_finite() {
        tracing::debug!(%delta, "temperature delta is not finite, skipping comparison");
        return String::new();
    }

    Band::from_delta(snap(delta), edges)
        .map(|band| band.sentence(phrases))
        .unwrap_or_default()
}
