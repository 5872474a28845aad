use async_trait::async_trait;
use serde::Deserialize;

use crate::cache::LocationCache;
use crate::error::{UpstreamError, WeatherError};
use crate::formatters::{format_relative_time, format_temperature, percent, text};
use crate::http::HttpFetcher;
use crate::models::{
    Coordinates, CurrentConditions, HourlyForecast, Measurement, ResolvedLocation, Units,
};

use super::{ProviderId, WeatherProvider};

// ============================================================================
// AccuWeather API Models
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwLocation {
    key: String,
    localized_name: Option<String>,
    country: Option<AwNamed>,
    geo_position: Option<AwGeoPosition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwNamed {
    localized_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwGeoPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwValue {
    value: Option<f64>,
    unit: Option<String>,
}

/// Current conditions report every measurement in both unit systems
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwUnitPair {
    imperial: Option<AwValue>,
    metric: Option<AwValue>,
}

impl AwUnitPair {
    fn pick(&self, units: Units) -> Option<&AwValue> {
        match units {
            Units::Imperial => self.imperial.as_ref(),
            Units::Metric => self.metric.as_ref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDirection {
    localized: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCurrentWind {
    direction: Option<AwDirection>,
    speed: Option<AwUnitPair>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourlyWind {
    direction: Option<AwDirection>,
    speed: Option<AwValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCurrentConditions {
    local_observation_date_time: Option<String>,
    weather_text: Option<String>,
    has_precipitation: Option<bool>,
    precipitation_type: Option<String>,
    temperature: Option<AwUnitPair>,
    relative_humidity: Option<f64>,
    wind: Option<AwCurrentWind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourlyForecast {
    date_time: Option<String>,
    icon_phrase: Option<String>,
    temperature: Option<AwValue>,
    relative_humidity: Option<f64>,
    wind: Option<AwHourlyWind>,
    precipitation_probability: Option<f64>,
    precipitation_type: Option<String>,
    precipitation_intensity: Option<String>,
}

fn wind_speed(speed: Option<&AwValue>, units: Units) -> Measurement<f64> {
    let unit = speed
        .and_then(|s| s.unit.clone())
        .unwrap_or_else(|| if units.is_metric() { "km/h" } else { "mi/h" }.to_string());

    Measurement {
        value: speed.and_then(|s| s.value).into(),
        unit,
    }
}

// ============================================================================
// Client
// ============================================================================

/// AccuWeather client. Resolution is a city search returning a location key,
/// which is cached so repeat lookups skip the search.
#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    http: HttpFetcher,
    cache: LocationCache,
    api_key: String,
    base_url: String,
}

impl AccuWeatherClient {
    pub fn new(
        http: HttpFetcher,
        cache: LocationCache,
        api_key: impl Into<String>,
        base_url: &str,
    ) -> Self {
        Self {
            http,
            cache,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn upstream(e: UpstreamError) -> WeatherError {
        WeatherError::upstream(ProviderId::AccuWeather, e)
    }

    async fn search_location(&self, place: &str) -> Result<ResolvedLocation, WeatherError> {
        let url = format!("{}/locations/v1/cities/search", self.base_url);
        let locations = self
            .http
            .get_json::<Vec<AwLocation>>(&url, &[("apikey", self.api_key.as_str()), ("q", place)])
            .await
            .map_err(Self::upstream)?;

        let first = locations
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(place.to_string()))?;

        Ok(ResolvedLocation {
            name: first
                .localized_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| place.to_string()),
            country: first.country.and_then(|c| c.localized_name),
            coordinates: first.geo_position.map(|g| Coordinates {
                latitude: g.latitude,
                longitude: g.longitude,
            }),
            id: first.key,
        })
    }

    fn current_from(current: AwCurrentConditions, units: Units) -> CurrentConditions {
        let temperature = current
            .temperature
            .as_ref()
            .and_then(|t| t.pick(units));
        let unit = temperature
            .and_then(|t| t.unit.clone())
            .unwrap_or_else(|| units.temperature_symbol().to_string());
        let wind = current.wind.unwrap_or_default();

        CurrentConditions {
            temperature: format_temperature(temperature.and_then(|t| t.value), &unit),
            weather_text: text(current.weather_text),
            relative_humidity: percent(current.relative_humidity),
            wind_speed: wind_speed(wind.speed.as_ref().and_then(|s| s.pick(units)), units),
            wind_direction: text(wind.direction.and_then(|d| d.localized)),
            precipitation: current.has_precipitation.into(),
            precipitation_type: text(current.precipitation_type),
            observation_time: text(current.local_observation_date_time),
        }
    }

    fn hourly_from(hours: Vec<AwHourlyForecast>, units: Units, limit: usize) -> Vec<HourlyForecast> {
        hours
            .into_iter()
            .take(limit)
            .zip(1u32..)
            .map(|(hour, offset)| {
                let temperature = hour.temperature.unwrap_or_default();
                let unit = temperature
                    .unit
                    .unwrap_or_else(|| units.temperature_symbol().to_string());
                let wind = hour.wind.unwrap_or_default();

                HourlyForecast {
                    relative_time: format_relative_time(offset),
                    offset_hours: offset,
                    forecast_time: text(hour.date_time),
                    temperature: format_temperature(temperature.value, &unit),
                    weather_text: text(hour.icon_phrase),
                    relative_humidity: percent(hour.relative_humidity),
                    wind_speed: wind_speed(wind.speed.as_ref(), units),
                    wind_direction: text(wind.direction.and_then(|d| d.localized)),
                    precipitation_probability: percent(hour.precipitation_probability),
                    precipitation_type: text(hour.precipitation_type),
                    precipitation_intensity: text(hour.precipitation_intensity),
                }
            })
            .collect()
    }
}

#[async_trait]
impl WeatherProvider for AccuWeatherClient {
    fn id(&self) -> ProviderId {
        ProviderId::AccuWeather
    }

    async fn resolve(&self, place: &str) -> Result<ResolvedLocation, WeatherError> {
        if let Some(cached) = self.cache.get(ProviderId::AccuWeather, place).await {
            tracing::debug!("Location cache hit for '{}': {}", place, cached.id);
            return Ok(cached);
        }

        let location = self.search_location(place).await?;

        if let Err(e) = self.cache.put(ProviderId::AccuWeather, place, &location).await {
            tracing::warn!("Failed to cache location key: {}", e);
        }
        Ok(location)
    }

    async fn get_current_conditions(
        &self,
        location: &ResolvedLocation,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let url = format!("{}/currentconditions/v1/{}", self.base_url, location.id);
        let conditions = self
            .http
            .get_json::<Vec<AwCurrentConditions>>(
                &url,
                &[("apikey", self.api_key.as_str()), ("details", "true")],
            )
            .await
            .map_err(Self::upstream)?;

        if conditions.is_empty() {
            tracing::warn!("No current conditions available for location {}", location.id);
        }
        let current = conditions.into_iter().next().unwrap_or_default();

        Ok(Self::current_from(current, units))
    }

    async fn get_hourly_forecast(
        &self,
        location: &ResolvedLocation,
        units: Units,
        hours: usize,
    ) -> Result<Vec<HourlyForecast>, WeatherError> {
        let url = format!("{}/forecasts/v1/hourly/12hour/{}", self.base_url, location.id);
        let mut query = vec![("apikey", self.api_key.as_str()), ("details", "true")];
        if units.is_metric() {
            query.push(("metric", "true"));
        }

        let forecast = self
            .http
            .get_json::<Vec<AwHourlyForecast>>(&url, &query)
            .await
            .map_err(Self::upstream)?;

        Ok(Self::hourly_from(forecast, units, hours))
    }
}
