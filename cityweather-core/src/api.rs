use std::{error::Error as StdError, fmt::Debug};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::WeatherResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Errors produced while talking to the weather provider.
///
/// Transport failures are classified up front so callers can pick a
/// user-facing message without inspecting the underlying HTTP error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("could not resolve host: {0}")]
    HostResolution(String),

    #[error("could not connect: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// Classify a reqwest error by what went wrong on the wire.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout;
        }

        if err.is_connect() {
            let detail = innermost_message(&err);
            return if mentions_dns(&err) {
                ApiError::HostResolution(detail)
            } else {
                ApiError::Unreachable(detail)
            };
        }

        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }

        ApiError::Transport(err.to_string())
    }
}

fn mentions_dns(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return true;
        }
        current = e.source();
    }
    false
}

fn innermost_message(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Current conditions for `city`, metric units.
    async fn current_weather(
        &self,
        city: &str,
        api_key: &str,
    ) -> Result<WeatherResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Use a preconfigured HTTP client, e.g. one with a request timeout.
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Error payload OpenWeather sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_weather(
        &self,
        city: &str,
        api_key: &str,
    ) -> Result<WeatherResponse, ApiError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = res.status();
        let body = res.text().await.map_err(ApiError::from_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_body(&body));

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
