use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::ServiceError,
    model::{CurrentConditions, FiveDayForecast, GeoCoordinates, HourlySample, LocationInfo, Place},
    provider::accuweather::AccuWeatherProvider,
};

pub mod accuweather;

/// Remote weather service operations used by the dashboard.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// Reverse-resolve coordinates to the place that contains them.
    async fn geolocate(&self, coordinates: GeoCoordinates) -> Result<Place, ServiceError>;

    async fn five_day_forecast(&self, key: &str) -> Result<FiveDayForecast, ServiceError>;

    async fn current_day_forecast(&self, key: &str)
    -> Result<Vec<CurrentConditions>, ServiceError>;

    async fn location_info(&self, key: &str) -> Result<LocationInfo, ServiceError>;

    async fn hourly_forecast(&self, key: &str) -> Result<Vec<HourlySample>, ServiceError>;

    async fn city_search(&self, query: &str) -> Result<Vec<Place>, ServiceError>;
}

/// Construct the AccuWeather-backed service from config.
pub fn service_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherService>> {
    let api_key = config.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `weather-dashboard configure` and enter your AccuWeather API key."
        )
    })?;

    let mut provider = AccuWeatherProvider::new(api_key.to_owned());
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    if let Some(language) = &config.language {
        provider = provider.with_language(language.clone());
    }

    Ok(Box::new(provider))
}
