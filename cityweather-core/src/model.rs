use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /data/2.5/weather`.
///
/// Every field is optional on the wire; nothing here is required for decoding
/// to succeed. Conversion into [`CurrentWeather`] decides the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weather: Vec<Condition>,
    /// Observation time, unix seconds.
    #[serde(default)]
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Condition>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let conditions: Option<Vec<Condition>> = Option::deserialize(deserializer)?;
    Ok(conditions.unwrap_or_default())
}

/// A value the provider may or may not have reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Reported(T),
    Missing,
}

impl<T> Reading<T> {
    pub fn as_ref(&self) -> Reading<&T> {
        match self {
            Reading::Reported(v) => Reading::Reported(v),
            Reading::Missing => Reading::Missing,
        }
    }

    pub fn reported(self) -> Option<T> {
        match self {
            Reading::Reported(v) => Some(v),
            Reading::Missing => None,
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Reading::Reported(_))
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Missing, Reading::Reported)
    }
}

/// Current conditions after the wire model has been normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// City name as the provider resolved it, if it sent one.
    pub city: Option<String>,
    pub temperature_c: Reading<f64>,
    pub humidity_pct: Reading<i64>,
    /// Description of the first reported condition, e.g. "light rain".
    pub description: Reading<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl From<WeatherResponse> for CurrentWeather {
    fn from(resp: WeatherResponse) -> Self {
        let main = resp.main.unwrap_or_default();

        let description = resp
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.description)
            .into();

        CurrentWeather {
            city: resp.name.filter(|n| !n.trim().is_empty()),
            temperature_c: main.temp.into(),
            humidity_pct: main.humidity.into(),
            description,
            observed_at: resp.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_payload() {
        let body = r#"{
            "name": "Nagpur",
            "dt": 1700000000,
            "main": { "temp": 29.4, "humidity": 41, "pressure": 1012 },
            "weather": [ { "main": "Clear", "description": "clear sky", "icon": "01d" } ]
        }"#;

        let resp: WeatherResponse = serde_json::from_str(body).expect("valid payload");
        let current = CurrentWeather::from(resp);

        assert_eq!(current.city.as_deref(), Some("Nagpur"));
        assert_eq!(current.temperature_c, Reading::Reported(29.4));
        assert_eq!(current.humidity_pct, Reading::Reported(41));
        assert_eq!(current.description, Reading::Reported("clear sky".into()));

        let observed = current.observed_at.expect("timestamp");
        assert_eq!(observed.timestamp(), 1_700_000_000);
    }

    #[test]
    fn missing_fields_become_missing_readings() {
        let resp: WeatherResponse = serde_json::from_str("{}").expect("empty object decodes");
        let current = CurrentWeather::from(resp);

        assert_eq!(current.city, None);
        assert_eq!(current.temperature_c, Reading::Missing);
        assert_eq!(current.humidity_pct, Reading::Missing);
        assert_eq!(current.description, Reading::Missing);
        assert!(current.observed_at.is_none());
    }

    #[test]
    fn explicit_nulls_are_tolerated() {
        let body = r#"{ "name": null, "main": { "temp": null, "humidity": 70 }, "weather": null }"#;
        let resp: WeatherResponse = serde_json::from_str(body).expect("nulls decode");
        assert!(resp.weather.is_empty());

        let current = CurrentWeather::from(resp);
        assert_eq!(current.temperature_c, Reading::Missing);
        assert_eq!(current.humidity_pct, Reading::Reported(70));
    }

    #[test]
    fn only_first_condition_is_used() {
        let body = r#"{ "weather": [ { "description": "mist" }, { "description": "rain" } ] }"#;
        let resp: WeatherResponse = serde_json::from_str(body).expect("valid payload");
        let current = CurrentWeather::from(resp);
        assert_eq!(current.description, Reading::Reported("mist".into()));
    }

    #[test]
    fn blank_city_name_is_dropped() {
        let resp = WeatherResponse {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(CurrentWeather::from(resp).city, None);
    }
}
