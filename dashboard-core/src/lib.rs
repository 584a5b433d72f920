//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Location resolution (persisted, geolocated, default) and its store
//! - The four-part forecast fetch and the remote service abstraction
//! - Rendering of a snapshot into a display-independent view tree
//! - The settings flow that lets a user pick another location
//!
//! It is used by `weather-dashboard`, but any front end that can draw a
//! [`view::ViewNode`] and implement the [`ui`] traits can drive it.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod ui;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use dashboard::{CycleOutcome, Dashboard};
pub use error::{DashboardError, FetchFailure, GeolocationError, ServiceError, StoreError};
pub use model::{GeoCoordinates, LocationCandidate, PersistedLocation, WeatherSnapshot};
pub use provider::WeatherService;
pub use resolver::{LocationDecision, LocationResolver, Resolution};
pub use settings::{SearchOutcome, SettingsController};
pub use ui::{BusyIndicator, Dialog, ModalHost, Notifier, Ui};
pub use view::{Action, ViewNode};
