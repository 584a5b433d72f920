use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::ServiceError,
    model::{
        CurrentConditions, FiveDayForecast, ForecastDay, GeoCoordinates, HourlySample,
        LocationInfo, Place,
    },
};

use super::WeatherService;

pub const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";

#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    api_key: String,
    base_url: String,
    language: Option<String>,
    http: Client,
}

impl AccuWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), language: None, http: Client::new() }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let url = format!("{}{}", self.base_url, path);

        let mut query = vec![("apikey", self.api_key.as_str())];
        if let Some(language) = &self.language {
            query.push(("language", language.as_str()));
        }
        query.extend_from_slice(extra);

        tracing::debug!(endpoint, %url, "requesting AccuWeather");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ServiceError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ServiceError::Parse { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwNamed {
    localized_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwPlace {
    key: String,
    localized_name: String,
    administrative_area: AwNamed,
    country: AwNamed,
}

impl From<AwPlace> for Place {
    fn from(p: AwPlace) -> Self {
        Place {
            key: p.key,
            localized_name: p.localized_name,
            administrative_area: p.administrative_area.localized_name,
            country: p.country.localized_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHeadline {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwRange {
    minimum: AwValue,
    maximum: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDayPart {
    icon: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDailyForecast {
    date: DateTime<FixedOffset>,
    temperature: AwRange,
    day: AwDayPart,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwFiveDayResponse {
    headline: AwHeadline,
    daily_forecasts: Vec<AwDailyForecast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwUnits {
    metric: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCurrentConditions {
    temperature: AwUnits,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourly {
    date_time: DateTime<FixedOffset>,
    temperature: AwValue,
}

#[async_trait]
impl WeatherService for AccuWeatherProvider {
    async fn geolocate(&self, coordinates: GeoCoordinates) -> Result<Place, ServiceError> {
        let q = format!("{},{}", coordinates.latitude, coordinates.longitude);
        let place: AwPlace = self
            .get_json("geoposition search", "/locations/v1/cities/geoposition/search", &[(
                "q",
                q.as_str(),
            )])
            .await?;
        Ok(place.into())
    }

    async fn five_day_forecast(&self, key: &str) -> Result<FiveDayForecast, ServiceError> {
        let parsed: AwFiveDayResponse = self
            .get_json(
                "five-day forecast",
                &format!("/forecasts/v1/daily/5day/{key}"),
                &[("metric", "true")],
            )
            .await?;

        Ok(FiveDayForecast {
            headline_text: parsed.headline.text,
            days: parsed
                .daily_forecasts
                .into_iter()
                .map(|d| ForecastDay {
                    date: d.date,
                    icon: d.day.icon,
                    max_temp: d.temperature.maximum.value,
                    min_temp: d.temperature.minimum.value,
                })
                .collect(),
        })
    }

    async fn current_day_forecast(
        &self,
        key: &str,
    ) -> Result<Vec<CurrentConditions>, ServiceError> {
        let parsed: Vec<AwCurrentConditions> = self
            .get_json("current conditions", &format!("/currentconditions/v1/{key}"), &[])
            .await?;

        if parsed.is_empty() {
            return Err(ServiceError::Empty { endpoint: "current conditions" });
        }

        Ok(parsed
            .into_iter()
            .map(|c| CurrentConditions { temperature_metric: c.temperature.metric.value })
            .collect())
    }

    async fn location_info(&self, key: &str) -> Result<LocationInfo, ServiceError> {
        let parsed: AwNamed =
            self.get_json("location info", &format!("/locations/v1/{key}"), &[]).await?;
        Ok(LocationInfo { localized_name: parsed.localized_name })
    }

    async fn hourly_forecast(&self, key: &str) -> Result<Vec<HourlySample>, ServiceError> {
        let parsed: Vec<AwHourly> = self
            .get_json(
                "hourly forecast",
                &format!("/forecasts/v1/hourly/12hour/{key}"),
                &[("metric", "true")],
            )
            .await?;

        Ok(parsed
            .into_iter()
            .map(|h| HourlySample { date_time: h.date_time, temperature: h.temperature.value })
            .collect())
    }

    async fn city_search(&self, query: &str) -> Result<Vec<Place>, ServiceError> {
        let parsed: Vec<AwPlace> = self
            .get_json("city search", "/locations/v1/cities/autocomplete", &[("q", query)])
            .await?;
        Ok(parsed.into_iter().map(Place::from).collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
