//! Core library for the `cityweather` client.
//!
//! This crate defines:
//! - Configuration & API key provisioning
//! - The OpenWeather client and the repository on top of it
//! - The view-model: UI state, fetch state machine, one-shot events
//! - City resolution from the device location
//!
//! It is used by `cityweather-cli`, but any front end can drive the
//! [`WeatherViewModel`] and render its state.

pub mod api;
pub mod config;
pub mod display;
pub mod events;
pub mod icons;
pub mod location;
pub mod model;
pub mod permission;
pub mod repository;
pub mod state;
pub mod view_model;

pub use api::{ApiError, OpenWeatherClient, WeatherApi};
pub use config::{Config, LocationConsent};
pub use events::{EventStream, Subscription, UiEvent};
pub use location::{Coordinates, LocationResolver};
pub use model::{CurrentWeather, Reading, WeatherResponse};
pub use repository::WeatherRepository;
pub use state::{Failure, FetchPhase, Forecast, WeatherUiState};
pub use view_model::WeatherViewModel;
