use async_trait::async_trait;

use crate::{error::GeolocationError, model::GeoCoordinates};

/// Single-shot access to the device position.
///
/// Implementations may take arbitrarily long (for example while waiting on a
/// permission prompt); callers do not cancel the request.
#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    async fn current_position(&self) -> Result<GeoCoordinates, GeolocationError>;
}

/// Position taken from configuration or the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoCoordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<GeoCoordinates, GeolocationError> {
        let GeoCoordinates { latitude, longitude } = self.0;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeolocationError::Unavailable);
        }
        Ok(self.0)
    }
}
