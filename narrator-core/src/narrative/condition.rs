//! Canned phrases for OpenWeather condition codes.
//!
//! Phrases are lowercase noun phrases so they read naturally after "with" or
//! as a subject complement ("Expect broken clouds").

/// Used when a code is unknown and the provider sent no usable description.
pub const UNKNOWN_CONDITION: &str = "unsettled weather";

/// Exact-match table, grouped by family. Codes absent here (500, 701, ...)
/// use the provider's own description.
pub static CONDITION_PHRASES: &[(u16, &str)] = &[
    // thunderstorm
    (200, "thunderstorms with light rain"),
    (201, "thunderstorms with rain"),
    (202, "thunderstorms with heavy rain"),
    (210, "light thunderstorms"),
    (211, "thunderstorms"),
    (212, "heavy thunderstorms"),
    (221, "ragged thunderstorms"),
    // drizzle
    (300, "light drizzle"),
    (301, "drizzle"),
    (302, "heavy drizzle"),
    (310, "light drizzly rain"),
    (311, "drizzly rain"),
    (312, "heavy drizzly rain"),
    (313, "showers and drizzle"),
    (314, "heavy rain"),
    (321, "drizzle showers"),
    // rain and snow
    (502, "heavy rain"),
    (503, "very heavy rain"),
    (504, "extreme rain"),
    (511, "freezing rain"),
    (520, "light showers"),
    (521, "showers"),
    (522, "heavy rain"),
    (531, "ragged showers"),
    (600, "light snow"),
    (601, "snow"),
    (602, "heavy snow"),
    (611, "sleet"),
    (612, "light sleet showers"),
    (613, "sleet showers"),
    (615, "light rain and snow"),
    (616, "rain and snow"),
    (620, "light snow showers"),
    (621, "snow showers"),
    (622, "heavy snow showers"),
    // atmosphere and clouds
    (731, "sand and dust whirls"),
    (741, "fog"),
    (751, "blowing sand"),
    (761, "dust"),
    (762, "volcanic ash"),
    (771, "squalls"),
    (781, "tornadoes"),
    (800, "clear skies"),
    (801, "a few clouds"),
    (802, "scattered clouds"),
    (803, "broken clouds"),
    (804, "overcast skies"),
    // extreme and wind
    (900, "a tornado"),
    (901, "a tropical storm"),
    (902, "a hurricane"),
    (903, "extreme cold"),
    (904, "extreme heat"),
    (905, "high winds"),
    (906, "hail"),
    (951, "calm air"),
    (952, "a light breeze"),
    (953, "a gentle breeze"),
    (954, "a moderate breeze"),
    (955, "a fresh breeze"),
    (956, "a strong breeze"),
    (957, "near-gale winds"),
    (958, "gale-force winds"),
    (959, "severe gales"),
    (960, "storms"),
    (961, "violent storms"),
    (962, "hurricane-force winds"),
];

/// Canned phrase for `code`, if the table has one.
pub fn phrase_for(code: u16) -> Option<&'static str> {
    CONDITION_PHRASES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, phrase)| *phrase)
}

/// Phrase for `code`, or `fallback` verbatim when the code is not in the table.
pub fn classify(code: u16, fallback: &str) -> &str {
    match phrase_for(code) {
        Some(phrase) => phrase,
        None if fallback.trim().is_empty() => UNKNOWN_CONDITION,
        None => fallback,
    }
}
