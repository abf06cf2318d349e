use chrono::{DateTime, Utc};

use crate::{
    api::ApiError,
    display::{format_description, format_humidity, format_temperature},
    icons::IconUrls,
    model::CurrentWeather,
};

pub const OFFLINE_MESSAGE: &str = "No internet connection (DNS failed). Check your network.";
pub const TIMEOUT_MESSAGE: &str = "Network timeout. Try again.";

/// Display-ready conditions for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub temp: String,
    pub humidity: String,
    pub description: String,
    pub icons: IconUrls,
    pub observed_at: Option<DateTime<Utc>>,
}

impl Forecast {
    /// `queried_city` is used when the provider did not echo a name back.
    pub fn from_current(queried_city: &str, current: &CurrentWeather) -> Self {
        let description = format_description(current.description.as_ref());
        Self {
            city: current.city.as_deref().unwrap_or(queried_city).to_string(),
            temp: format_temperature(current.temperature_c.as_ref()),
            humidity: format_humidity(current.humidity_pct.as_ref()),
            icons: IconUrls::for_description(&description),
            description,
            observed_at: current.observed_at,
        }
    }
}

/// Why the last fetch attempt did not produce a forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    EmptyCity,
    MissingApiKey,
    Offline,
    Timeout,
    Other(String),
}

impl Failure {
    pub fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::HostResolution(_) | ApiError::Unreachable(_) => Failure::Offline,
            ApiError::Timeout => Failure::Timeout,
            other => Failure::Other(other.to_string()),
        }
    }

    /// Text kept in state for the screen.
    pub fn message(&self) -> String {
        match self {
            Failure::EmptyCity => "Enter a city".to_string(),
            Failure::MissingApiKey => "API key missing".to_string(),
            Failure::Offline => OFFLINE_MESSAGE.to_string(),
            Failure::Timeout => TIMEOUT_MESSAGE.to_string(),
            Failure::Other(msg) if msg.trim().is_empty() => {
                "Failed to fetch weather: unknown error".to_string()
            }
            Failure::Other(msg) => format!("Failed to fetch weather: {msg}"),
        }
    }

    /// Text for the transient notification.
    pub fn notice(&self) -> String {
        match self {
            Failure::EmptyCity => "Please enter city name".to_string(),
            Failure::MissingApiKey => "API Key Missing".to_string(),
            other => other.message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success(Forecast),
    Failed(Failure),
}

/// Snapshot rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherUiState {
    pub city_name: String,
    pub phase: FetchPhase,
}

impl WeatherUiState {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, FetchPhase::Loading)
    }

    pub fn error(&self) -> Option<String> {
        match &self.phase {
            FetchPhase::Failed(f) => Some(f.message()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.phase {
            FetchPhase::Failed(f) => Some(f),
            _ => None,
        }
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match &self.phase {
            FetchPhase::Success(f) => Some(f),
            _ => None,
        }
    }

    pub fn temp(&self) -> &str {
        self.forecast().map_or("", |f| f.temp.as_str())
    }

    pub fn humidity(&self) -> &str {
        self.forecast().map_or("", |f| f.humidity.as_str())
    }

    pub fn icon_day(&self) -> Option<&str> {
        self.forecast().map(|f| f.icons.day.as_str())
    }

    pub fn icon_night(&self) -> Option<&str> {
        self.forecast().map(|f| f.icons.night.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reading;

    fn current(
        temp: Option<f64>,
        humidity: Option<i64>,
        description: Option<&str>,
    ) -> CurrentWeather {
        CurrentWeather {
            city: None,
            temperature_c: temp.into(),
            humidity_pct: humidity.into(),
            description: description.map(str::to_string).into(),
            observed_at: None,
        }
    }

    #[test]
    fn forecast_formats_readings() {
        let readings = current(Some(21.999), Some(63), Some("Clear Sky"));
        let forecast = Forecast::from_current("Delhi", &readings);

        assert_eq!(forecast.city, "Delhi");
        assert_eq!(forecast.temp, "22.0°C");
        assert_eq!(forecast.humidity, "63%");
        assert_eq!(forecast.icons, IconUrls::for_code("01"));
    }

    #[test]
    fn forecast_prefers_provider_city_name() {
        let mut cur = current(None, None, None);
        cur.city = Some("New Delhi".into());
        assert_eq!(Forecast::from_current("delhi", &cur).city, "New Delhi");
    }

    #[test]
    fn forecast_without_readings_uses_placeholders() {
        let forecast = Forecast::from_current("X", &current(None, None, None));
        assert_eq!(forecast.temp, "N/A");
        assert_eq!(forecast.humidity, "N/A");
        assert_eq!(forecast.description, "N/A");
        assert_eq!(forecast.icons, IconUrls::for_code("01"));
        assert!(!Reading::<f64>::Missing.is_reported());
    }

    #[test]
    fn transport_errors_are_classified() {
        let dns = ApiError::HostResolution("x".into());
        let refused = ApiError::Unreachable("x".into());
        assert_eq!(Failure::from_api_error(&dns), Failure::Offline);
        assert_eq!(Failure::from_api_error(&refused), Failure::Offline);
        let timeout = Failure::from_api_error(&ApiError::Timeout);
        assert_eq!(timeout, Failure::Timeout);

        let unauthorized = ApiError::Status {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(
            Failure::from_api_error(&unauthorized).message(),
            "Failed to fetch weather: HTTP 401: Invalid API key"
        );
    }

    #[test]
    fn failure_messages() {
        assert_eq!(Failure::EmptyCity.message(), "Enter a city");
        assert_eq!(Failure::EmptyCity.notice(), "Please enter city name");
        assert_eq!(Failure::MissingApiKey.message(), "API key missing");
        assert_eq!(Failure::MissingApiKey.notice(), "API Key Missing");
        assert_eq!(Failure::Offline.notice(), OFFLINE_MESSAGE);
        assert_eq!(
            Failure::Other(String::new()).message(),
            "Failed to fetch weather: unknown error"
        );
    }

    #[test]
    fn accessors_follow_phase() {
        let mut state = WeatherUiState::default();
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.temp(), "");

        state.phase = FetchPhase::Loading;
        assert!(state.is_loading());

        state.phase = FetchPhase::Failed(Failure::Timeout);
        assert!(!state.is_loading());
        assert_eq!(state.error().as_deref(), Some(TIMEOUT_MESSAGE));
        assert_eq!(state.icon_day(), None);
    }
}
