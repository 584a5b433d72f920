use std::sync::Arc;

use crate::{
    error::{GeolocationError, StoreError},
    geolocation::Geolocator,
    model::PersistedLocation,
    provider::WeatherService,
    store::LocationStore,
    ui::Notifier,
};

pub const DEFAULT_LOCATION_KEY: &str = "274663";
pub const DEFAULT_LOCATION_LABEL: &str = "Warsaw, Masovia, Poland";

pub fn default_location() -> PersistedLocation {
    PersistedLocation::new(DEFAULT_LOCATION_KEY, DEFAULT_LOCATION_LABEL)
}

/// Which source the location for this cycle came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationDecision {
    UsePersisted,
    UseGeolocated { key: String, label: String },
    UseDefault,
}

/// Outcome of looking a location up, before anything is written.
#[derive(Debug)]
pub struct Resolution {
    pub location: PersistedLocation,
    pub decision: LocationDecision,
    /// Why geolocation was given up on, when it was attempted.
    pub geolocation_error: Option<GeolocationError>,
}

/// Picks the location to show: stored, geolocated, or the default.
///
/// [`plan`](Self::plan) only reads; [`commit`](Self::commit) writes the
/// picked location into the [`LocationStore`] and raises the notification.
pub struct LocationResolver {
    store: LocationStore,
    service: Arc<dyn WeatherService>,
    geolocator: Option<Arc<dyn Geolocator>>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("store", &self.store)
            .field("geolocator", &self.geolocator)
            .finish_non_exhaustive()
    }
}

impl LocationResolver {
    pub fn new(
        store: LocationStore,
        service: Arc<dyn WeatherService>,
        geolocator: Option<Arc<dyn Geolocator>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { store, service, geolocator, notifier }
    }

    /// Plan and commit in one go.
    pub async fn resolve(&self) -> Result<LocationDecision, StoreError> {
        let resolution = self.plan().await?;
        self.commit(&resolution)?;
        Ok(resolution.decision)
    }

    pub async fn plan(&self) -> Result<Resolution, StoreError> {
        if let Some(location) = self.store.load()? {
            tracing::debug!(key = %location.key, "using persisted location");
            return Ok(Resolution {
                location,
                decision: LocationDecision::UsePersisted,
                geolocation_error: None,
            });
        }

        let Some(geolocator) = &self.geolocator else {
            tracing::info!("no geolocation available, using default location");
            return Ok(Resolution {
                location: default_location(),
                decision: LocationDecision::UseDefault,
                geolocation_error: None,
            });
        };

        Ok(match self.geolocate(geolocator.as_ref()).await {
            Ok(location) => {
                tracing::info!(key = %location.key, label = %location.label, "geolocated");
                let decision = LocationDecision::UseGeolocated {
                    key: location.key.clone(),
                    label: location.label.clone(),
                };
                Resolution { location, decision, geolocation_error: None }
            }
            Err(err) => {
                tracing::warn!(error = %err, "geolocation failed, using default location");
                Resolution {
                    location: default_location(),
                    decision: LocationDecision::UseDefault,
                    geolocation_error: Some(err),
                }
            }
        })
    }

    /// Persist a planned location. A persisted one is left as it is.
    pub fn commit(&self, resolution: &Resolution) -> Result<(), StoreError> {
        if let Some(err) = &resolution.geolocation_error {
            self.notifier.error("Fetch geolocation data error", &err.to_string());
        }
        if resolution.decision == LocationDecision::UsePersisted {
            return Ok(());
        }
        self.store.save(&resolution.location)
    }

    async fn geolocate(&self, geolocator: &dyn Geolocator) -> Result<PersistedLocation, GeolocationError> {
        let coordinates = geolocator.current_position().await?;
        let place = self.service.geolocate(coordinates).await?;
        Ok(PersistedLocation::new(place.key.clone(), place.label()))
    }
}
