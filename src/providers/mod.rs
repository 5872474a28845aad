use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

use crate::cache::LocationCache;
use crate::config::WeatherConfig;
use crate::constants::DEFAULT_FORECAST_HOURS;
use crate::error::WeatherError;
use crate::formatters::validate_location;
use crate::http::HttpFetcher;
use crate::models::{CurrentConditions, HourlyForecast, ResolvedLocation, Units, WeatherReport};

pub mod accuweather;
pub mod weathergov;

pub use accuweather::AccuWeatherClient;
pub use weathergov::WeatherGovClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    WeatherGov,
    AccuWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherGov => "weathergov",
            ProviderId::AccuWeather => "accuweather",
        }
    }

    /// Name reported in the `source` field of a report
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::WeatherGov => "Weather.gov",
            ProviderId::AccuWeather => "AccuWeather",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::AccuWeather)
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherGov, ProviderId::AccuWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "weathergov" => Ok(ProviderId::WeatherGov),
            "accuweather" => Ok(ProviderId::AccuWeather),
            _ => Err(WeatherError::Configuration(format!(
                "Invalid weather source '{value}'. Supported sources: weathergov, accuweather."
            ))),
        }
    }
}

/// Contract shared by every upstream weather provider.
///
/// Implementations own all provider quirks: resolution round trips, field
/// names and unit conventions. Callers only ever see normalized models.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Resolves a place name to a provider location, consulting the cache first
    async fn resolve(&self, place: &str) -> Result<ResolvedLocation, WeatherError>;

    async fn get_current_conditions(
        &self,
        location: &ResolvedLocation,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError>;

    /// Returns up to `hours` entries in upstream order; fewer is not an error
    async fn get_hourly_forecast(
        &self,
        location: &ResolvedLocation,
        units: Units,
        hours: usize,
    ) -> Result<Vec<HourlyForecast>, WeatherError>;

    /// Current conditions plus a 12-hour forecast for a place name
    async fn get_hourly_weather(
        &self,
        place: &str,
        units: Units,
    ) -> Result<WeatherReport, WeatherError> {
        let place = validate_location(place)?;
        let location = self.resolve(place).await?;
        let current_conditions = self.get_current_conditions(&location, units).await?;
        let hourly_forecast = self
            .get_hourly_forecast(&location, units, DEFAULT_FORECAST_HOURS)
            .await?;

        Ok(WeatherReport {
            location: location.label(),
            source: self.id().display_name().to_string(),
            current_conditions,
            hourly_forecast,
        })
    }
}

/// Construct the provider named by the configuration.
///
/// Missing credentials fail here rather than on the first request.
pub fn create_provider(
    config: &WeatherConfig,
    cache: LocationCache,
) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let id = config.source;
    tracing::info!("Using weather source: {}", id);

    let api_key = config
        .accuweather_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());
    if id.requires_api_key() && api_key.is_none() {
        return Err(WeatherError::Configuration(
            "ACCUWEATHER_API_KEY is required for AccuWeather client.".to_string(),
        ));
    }

    let http = HttpFetcher::new().map_err(|e| {
        WeatherError::Configuration(format!("failed to build HTTP client: {}", e))
    })?;

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::AccuWeather => Arc::new(AccuWeatherClient::new(
            http,
            cache,
            api_key.unwrap_or_default(),
            &config.endpoints.accuweather,
        )),
        ProviderId::WeatherGov => Arc::new(WeatherGovClient::new(
            http,
            cache,
            &config.endpoints.weathergov,
            &config.endpoints.nominatim,
        )),
    };

    Ok(provider)
}
