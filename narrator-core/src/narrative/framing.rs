use serde::{Deserialize, Serialize};

/// Subject of a comparison sentence and the period it is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhrasePair {
    pub subject: &'static str,
    pub reference: &'static str,
}

pub const TODAY: PhrasePair = PhrasePair { subject: "Today", reference: "yesterday" };
pub const THIS_AFTERNOON: PhrasePair =
    PhrasePair { subject: "This afternoon", reference: "yesterday" };
pub const THIS_EVENING: PhrasePair =
    PhrasePair { subject: "This evening", reference: "last night" };
pub const TONIGHT: PhrasePair = PhrasePair { subject: "Tonight", reference: "last night" };

/// Which time signal the narrative is framed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingPolicy {
    /// Four buckets from the local hour.
    #[default]
    HourOfDay,
    /// Two buckets from a day/night indicator.
    DayNight,
}

impl std::fmt::Display for FramingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FramingPolicy::HourOfDay => "hour_of_day",
            FramingPolicy::DayNight => "day_night",
        })
    }
}

/// The single signal a comparison is framed by; one sentence never mixes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSignal {
    /// Local hour, 0-23.
    Hour(u32),
    Daylight(bool),
}

pub fn frame_hour(hour: u32) -> PhrasePair {
    match hour {
        5..=11 => TODAY,
        12..=17 => THIS_AFTERNOON,
        18..=21 => THIS_EVENING,
        _ => TONIGHT,
    }
}

pub fn frame_daylight(is_daytime: bool) -> PhrasePair {
    if is_daytime { TODAY } else { TONIGHT }
}

pub fn frame(signal: TimeSignal) -> PhrasePair {
    match signal {
        TimeSignal::Hour(hour) => frame_hour(hour),
        TimeSignal::Daylight(is_daytime) => frame_daylight(is_daytime),
    }
}
