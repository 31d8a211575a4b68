//! The static city registry.
use serde::Serialize;

/// A selectable city and the IANA time zone it observes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct City {
    /// Display name, unique within the registry.
    pub name: &'static str,

    /// IANA time zone identifier, e.g. `Asia/Tokyo`.
    pub timezone: &'static str,
}

impl City {
    const fn new(name: &'static str, timezone: &'static str) -> Self {
        Self { name, timezone }
    }
}

// Must stay sorted by name, `find` relies on it.
static CITIES: [City; 43] = [
    City::new("Amsterdam", "Europe/Amsterdam"),
    City::new("Atlanta", "America/New_York"),
    City::new("Bangalore", "Asia/Kolkata"),
    City::new("Bangkok", "Asia/Bangkok"),
    City::new("Barcelona", "Europe/Madrid"),
    City::new("Beijing", "Asia/Shanghai"),
    City::new("Berlin", "Europe/Berlin"),
    City::new("Chicago", "America/Chicago"),
    City::new("Dubai", "Asia/Dubai"),
    City::new("Dublin", "Europe/Dublin"),
    City::new("Frankfurt", "Europe/Berlin"),
    City::new("Hong Kong", "Asia/Hong_Kong"),
    City::new("Istanbul", "Europe/Istanbul"),
    City::new("Jakarta", "Asia/Jakarta"),
    City::new("Johannesburg", "Africa/Johannesburg"),
    City::new("Kuala Lumpur", "Asia/Kuala_Lumpur"),
    City::new("London", "Europe/London"),
    City::new("Los Angeles", "America/Los_Angeles"),
    City::new("Madrid", "Europe/Madrid"),
    City::new("Melbourne", "Australia/Melbourne"),
    City::new("Mexico City", "America/Mexico_City"),
    City::new("Milan", "Europe/Rome"),
    City::new("Moscow", "Europe/Moscow"),
    City::new("Mumbai", "Asia/Kolkata"),
    City::new("New Delhi", "Asia/Kolkata"),
    City::new("New York", "America/New_York"),
    City::new("Paris", "Europe/Paris"),
    City::new("Rome", "Europe/Rome"),
    City::new("San Francisco", "America/Los_Angeles"),
    City::new("San Jose", "America/Los_Angeles"),
    City::new("São Paulo", "America/Sao_Paulo"),
    City::new("Seoul", "Asia/Seoul"),
    City::new("Shanghai", "Asia/Shanghai"),
    City::new("Singapore", "Asia/Singapore"),
    City::new("Stockholm", "Europe/Stockholm"),
    City::new("Sydney", "Australia/Sydney"),
    City::new("Tel Aviv", "Asia/Tel_Aviv"),
    City::new("Tokyo", "Asia/Tokyo"),
    City::new("Toronto", "America/Toronto"),
    City::new("Vancouver", "America/Vancouver"),
    City::new("Vienna", "Europe/Vienna"),
    City::new("Warsaw", "Europe/Warsaw"),
    City::new("Zurich", "Europe/Zurich"),
];

/// All known cities, sorted by name.
pub fn all() -> &'static [City] {
    &CITIES
}

/// Look up a city by its exact display name.
pub fn find(name: &str) -> Option<&'static City> {
    CITIES
        .binary_search_by(|c| c.name.cmp(&name))
        .ok()
        .map(|i| &CITIES[i])
}
