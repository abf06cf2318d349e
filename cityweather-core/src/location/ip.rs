use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{Coordinates, LocationProvider, Priority};

pub const IP_API_URL: &str = "http://ip-api.com";

/// A position supplied up front, e.g. from command-line arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(
        &self,
        _priority: Priority,
        _cancel: CancellationToken,
    ) -> Result<Option<Coordinates>> {
        Ok(Some(self.0))
    }
}

/// Approximate position from the public IP address (ip-api.com).
///
/// Accuracy is city level at best, whatever [`Priority`] is requested.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    base_url: String,
    http: Client,
}

impl Default for IpLocationProvider {
    fn default() -> Self {
        Self::new(IP_API_URL)
    }
}

impl IpLocationProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_coordinates(self) -> Result<Option<Coordinates>> {
        if self.status != "success" {
            return Err(anyhow!(
                "ip-api lookup failed: {}",
                self.message.as_deref().unwrap_or("unknown reason")
            ));
        }

        let (Some(latitude), Some(longitude)) = (self.lat, self.lon) else {
            return Ok(None);
        };

        Ok(Some(Coordinates {
            latitude,
            longitude,
        }))
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn current_location(
        &self,
        priority: Priority,
        cancel: CancellationToken,
    ) -> Result<Option<Coordinates>> {
        let url = format!("{}/json/", self.base_url);
        tracing::debug!(?priority, %url, "requesting ip location");

        let request = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send();

        let res = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            res = request => res.context("Failed to send request to ip-api")?,
        };

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("ip-api request failed with status {status}"));
        }

        let body: IpApiResponse = res.json().await.context("Failed to parse ip-api JSON")?;
        body.into_coordinates()
    }
}
