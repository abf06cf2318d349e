//! Turning the device position into a city name.
//!
//! The platform pieces sit behind traits: [`PermissionChecker`] for the
//! permission precheck, [`LocationProvider`] for a one-shot position fix and
//! [`Geocoder`] for (blocking) reverse geocoding. [`LocationResolver`] chains
//! them and collapses every failure to `None`.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::permission::{PermissionChecker, location_granted};

pub mod ip;
pub mod nominatim;

pub use ip::{FixedLocation, IpLocationProvider};
pub use nominatim::NominatimGeocoder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reverse geocoding result, coarsest-to-finest fields are all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub locality: Option<String>,
    pub sub_admin_area: Option<String>,
    pub admin_area: Option<String>,
    pub feature_name: Option<String>,
}

impl Address {
    /// Locality, then sub-admin area, admin area, feature name.
    pub fn city_name(self) -> Option<String> {
        self.locality
            .or(self.sub_admin_area)
            .or(self.admin_area)
            .or(self.feature_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    HighAccuracy,
    Balanced,
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// One position fix. Implementations should stop work once `cancel` fires.
    async fn current_location(
        &self,
        priority: Priority,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<Coordinates>>;
}

/// Reverse geocoder. Called on the blocking pool, so it may block.
pub trait Geocoder: Send + Sync + Debug + 'static {
    fn reverse_geocode(&self, at: Coordinates) -> anyhow::Result<Option<Address>>;
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    permissions: Arc<dyn PermissionChecker>,
    provider: Arc<dyn LocationProvider>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(
        permissions: Arc<dyn PermissionChecker>,
        provider: Arc<dyn LocationProvider>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            permissions,
            provider,
            geocoder,
        }
    }

    /// Does not ask for permission; callers are expected to have done so.
    pub async fn city_from_location(&self, cancel: &CancellationToken) -> Option<String> {
        if !location_granted(self.permissions.as_ref()) {
            tracing::debug!("location permission not granted");
            return None;
        }

        let fix = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("location request cancelled");
                return None;
            }
            fix = self.provider.current_location(Priority::HighAccuracy, cancel.clone()) => fix,
        };

        let at = match fix {
            Ok(Some(at)) => at,
            Ok(None) => {
                tracing::debug!("no location fix available");
                return None;
            }
            Err(err) => {
                tracing::debug!(error = %err, "location fix failed");
                return None;
            }
        };

        let geocoder = Arc::clone(&self.geocoder);
        let lookup = tokio::task::spawn_blocking(move || geocoder.reverse_geocode(at));

        let address = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("reverse geocoding cancelled");
                return None;
            }
            res = lookup => res,
        };

        match address {
            Ok(Ok(Some(addr))) => addr.city_name(),
            Ok(Ok(None)) => {
                tracing::debug!(?at, "no address for location");
                None
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "reverse geocoding failed");
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "reverse geocoding task failed");
                None
            }
        }
    }
}
