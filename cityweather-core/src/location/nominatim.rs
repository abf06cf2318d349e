//! Reverse geocoding through Nominatim (OpenStreetMap). Free, no API key.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Address, Coordinates, Geocoder};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

/// Blocking client; the resolver runs it on the blocking pool.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new(NOMINATIM_URL)
    }
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
}

impl NominatimResponse {
    fn into_address(self) -> Option<Address> {
        let addr = self.address?;
        let locality = [addr.city, addr.town, addr.village, addr.municipality]
            .into_iter()
            .flatten()
            .next();

        Some(Address {
            locality,
            sub_admin_area: addr.county.or(addr.state_district),
            admin_area: addr.state,
            feature_name: self.name.filter(|n| !n.is_empty()),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse_geocode(&self, at: Coordinates) -> Result<Option<Address>> {
        // Built per call so the blocking client never lives on an async thread.
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create geocoding client")?;

        let url = format!("{}/reverse", self.base_url);
        let res = http
            .get(&url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .context("Failed to send reverse geocoding request")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Reverse geocoding failed with status {status}"));
        }

        let body: NominatimResponse = res.json().context("Failed to parse Nominatim JSON")?;
        Ok(body.into_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<Address> {
        serde_json::from_str::<NominatimResponse>(json)
            .expect("valid Nominatim body")
            .into_address()
    }

    #[test]
    fn city_maps_to_locality() {
        let body = r#"{
            "name": "Nagpur",
            "address": { "city": "Nagpur", "county": "Nagpur Rural", "state": "Maharashtra" }
        }"#;

        let addr = parse(body).expect("address");
        assert_eq!(addr.locality.as_deref(), Some("Nagpur"));
        assert_eq!(addr.sub_admin_area.as_deref(), Some("Nagpur Rural"));
        assert_eq!(addr.admin_area.as_deref(), Some("Maharashtra"));
    }

    #[test]
    fn town_and_village_count_as_locality() {
        let town = parse(r#"{"address":{"town":"Kamptee"}}"#).expect("town");
        assert_eq!(town.locality.as_deref(), Some("Kamptee"));

        let body = r#"{"address":{"village":"Khapa","state":"Maharashtra"}}"#;
        let village = parse(body).expect("village");
        assert_eq!(village.city_name().as_deref(), Some("Khapa"));
    }

    #[test]
    fn rural_point_falls_back_to_state() {
        let body = r#"{"name":"","address":{"state":"Ladakh"}}"#;
        let addr = parse(body).expect("state");
        assert_eq!(addr.feature_name, None);
        assert_eq!(addr.city_name().as_deref(), Some("Ladakh"));
    }

    #[test]
    fn missing_address_block_is_none() {
        assert_eq!(parse(r#"{"error":"Unable to geocode"}"#), None);
    }
}
