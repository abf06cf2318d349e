use std::sync::Arc;

use crate::{
    api::{ApiError, OpenWeatherClient, WeatherApi},
    model::CurrentWeather,
};

/// Wraps a [`WeatherApi`] and hands back normalised conditions.
///
/// Never panics: every failure comes back as the classified [`ApiError`].
#[derive(Debug, Clone)]
pub struct WeatherRepository {
    api: Arc<dyn WeatherApi>,
}

impl WeatherRepository {
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    /// Repository backed by the real OpenWeather endpoint at `base_url`.
    pub fn open_weather(base_url: &str) -> Self {
        Self::new(Arc::new(OpenWeatherClient::new(base_url)))
    }

    pub async fn fetch_current_weather(
        &self,
        city: &str,
        api_key: &str,
    ) -> Result<CurrentWeather, ApiError> {
        tracing::debug!(city, "requesting current weather");

        match self.api.current_weather(city, api_key).await {
            Ok(resp) => {
                tracing::debug!(?resp, "weather response");
                Ok(resp.into())
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "weather request failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MainReadings, Reading, WeatherResponse};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Canned(Result<WeatherResponse, ApiError>);

    #[async_trait]
    impl WeatherApi for Canned {
        async fn current_weather(
            &self,
            _city: &str,
            _api_key: &str,
        ) -> Result<WeatherResponse, ApiError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn success_is_normalised() {
        let resp = WeatherResponse {
            name: Some("Pune".into()),
            main: Some(MainReadings {
                temp: Some(24.0),
                humidity: None,
            }),
            ..Default::default()
        };
        let repo = WeatherRepository::new(Arc::new(Canned(Ok(resp))));

        let current = repo
            .fetch_current_weather("Pune", "KEY")
            .await
            .expect("success");
        assert_eq!(current.city.as_deref(), Some("Pune"));
        assert_eq!(current.temperature_c, Reading::Reported(24.0));
        assert_eq!(current.humidity_pct, Reading::Missing);
    }

    #[tokio::test]
    async fn failure_is_passed_through() {
        let repo = WeatherRepository::new(Arc::new(Canned(Err(ApiError::Timeout))));

        let err = repo
            .fetch_current_weather("Pune", "KEY")
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Timeout);
    }
}
