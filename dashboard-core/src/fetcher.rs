use std::sync::Arc;

use crate::{
    error::{FetchFailure, ServiceError, SnapshotPart},
    model::WeatherSnapshot,
    provider::WeatherService,
};

/// Retrieves the four parts of a weather snapshot as one unit.
#[derive(Debug, Clone)]
pub struct WeatherDataFetcher {
    service: Arc<dyn WeatherService>,
}

impl WeatherDataFetcher {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service }
    }

    /// Fetch every part for `key` concurrently.
    ///
    /// Succeeds only if all four retrievals succeed and the result has
    /// everything the renderer reads; otherwise no part of it is returned.
    pub async fn fetch(&self, key: &str) -> Result<WeatherSnapshot, FetchFailure> {
        let failed = |part: SnapshotPart| {
            move |source: ServiceError| FetchFailure::Retrieval { key: key.to_string(), part, source }
        };

        tracing::debug!(key, "fetching weather snapshot");

        let (five_day, current_day, location_info, hourly) = tokio::try_join!(
            async { self.service.five_day_forecast(key).await.map_err(failed(SnapshotPart::FiveDay)) },
            async {
                self.service
                    .current_day_forecast(key)
                    .await
                    .map_err(failed(SnapshotPart::CurrentDay))
            },
            async {
                self.service.location_info(key).await.map_err(failed(SnapshotPart::LocationInfo))
            },
            async { self.service.hourly_forecast(key).await.map_err(failed(SnapshotPart::Hourly)) },
        )?;

        let snapshot = WeatherSnapshot { five_day, current_day, location_info, hourly };

        if let Some(reason) = snapshot.missing_part() {
            return Err(FetchFailure::Incomplete { key: key.to_string(), reason });
        }

        Ok(snapshot)
    }
}
