//! Condition description to OpenWeather icon mapping.

/// Icon code used when a description is not in [`ICON_CODES`].
pub const DEFAULT_ICON_CODE: &str = "01";

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Lower-case description → OpenWeather icon code.
pub const ICON_CODES: [(&str, &str); 9] = [
    ("clear sky", "01"),
    ("few clouds", "02"),
    ("scattered clouds", "03"),
    ("broken clouds", "04"),
    ("shower rain", "09"),
    ("rain", "10"),
    ("thunderstorm", "11"),
    ("snow", "13"),
    ("mist", "50"),
];

/// Day and night variants of the same condition icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconUrls {
    pub day: String,
    pub night: String,
}

impl IconUrls {
    pub fn for_code(code: &str) -> Self {
        Self {
            day: format!("{ICON_BASE_URL}/{code}d@4x.png"),
            night: format!("{ICON_BASE_URL}/{code}n@4x.png"),
        }
    }

    pub fn for_description(description: &str) -> Self {
        Self::for_code(icon_code(description))
    }
}

/// Case-insensitive lookup, falling back to [`DEFAULT_ICON_CODE`].
pub fn icon_code(description: &str) -> &'static str {
    let wanted = description.trim().to_lowercase();
    ICON_CODES
        .iter()
        .find(|(desc, _)| *desc == wanted)
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_ICON_CODE)
}
