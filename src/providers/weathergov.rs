use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::cache::LocationCache;
use crate::constants::DEFAULT_FORECAST_HOURS;
use crate::error::{UpstreamError, WeatherError};
use crate::formatters::{
    format_relative_time, format_temperature, parse_wind_speed, percent, text, validate_location,
};
use crate::http::HttpFetcher;
use crate::models::{
    Coordinates, CurrentConditions, HourlyForecast, Measurement, Reading, ResolvedLocation,
    Units, WeatherReport,
};

use super::{ProviderId, WeatherProvider};

// ============================================================================
// Nominatim / National Weather Service API Models
// ============================================================================

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    grid_id: String,
    grid_x: i32,
    grid_y: i32,
    relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: RelativeLocationProperties,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationProperties {
    city: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: Option<ForecastProperties>,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    start_time: Option<String>,
    temperature: Option<f64>,
    temperature_unit: Option<String>,
    short_forecast: Option<String>,
    wind_speed: Option<String>,
    wind_direction: Option<String>,
    probability_of_precipitation: Option<QuantitativeValue>,
    relative_humidity: Option<QuantitativeValue>,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}

// ============================================================================
// Client
// ============================================================================

/// Weather.gov client. Place names are geocoded with Nominatim, then mapped to
/// an NWS forecast grid cell; the grid cell (`OFFICE/X,Y`) is the resolved id.
///
/// Current conditions are the first hourly period; the forecast is the periods
/// after it.
#[derive(Debug, Clone)]
pub struct WeatherGovClient {
    http: HttpFetcher,
    cache: LocationCache,
    base_url: String,
    geocoder_url: String,
}

impl WeatherGovClient {
    pub fn new(http: HttpFetcher, cache: LocationCache, base_url: &str, geocoder_url: &str) -> Self {
        Self {
            http,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            geocoder_url: geocoder_url.trim_end_matches('/').to_string(),
        }
    }

    fn upstream(e: UpstreamError) -> WeatherError {
        WeatherError::upstream(ProviderId::WeatherGov, e)
    }

    /// Geocodes a place name with Nominatim
    async fn geocode(&self, place: &str) -> Result<Coordinates, WeatherError> {
        let url = format!("{}/search", self.geocoder_url);
        let places = self
            .http
            .get_json::<Vec<NominatimPlace>>(&url, &[("q", place), ("format", "json"), ("limit", "1")])
            .await
            .map_err(Self::upstream)?;

        let first = places
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(place.to_string()))?;

        let parse = |raw: &str| {
            raw.parse::<f64>().map_err(|_| {
                Self::upstream(UpstreamError::Malformed(format!(
                    "invalid coordinate '{}' from geocoder",
                    raw
                )))
            })
        };

        Ok(Coordinates {
            latitude: parse(&first.lat)?,
            longitude: parse(&first.lon)?,
        })
    }

    /// Maps coordinates onto the NWS forecast grid
    async fn lookup_grid(
        &self,
        place: &str,
        coordinates: Coordinates,
    ) -> Result<ResolvedLocation, WeatherError> {
        let url = format!(
            "{}/points/{:.4},{:.4}",
            self.base_url, coordinates.latitude, coordinates.longitude
        );

        let points = self
            .http
            .get_json::<PointsResponse>(&url, &[])
            .await
            .map_err(|e| {
                // NWS answers 404 for points outside its coverage area
                if e.status() == Some(StatusCode::NOT_FOUND) {
                    WeatherError::LocationNotFound(place.to_string())
                } else {
                    Self::upstream(e)
                }
            })?;

        let props = points.properties;
        let name = props
            .relative_location
            .and_then(|rel| match (rel.properties.city, rel.properties.state) {
                (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
                (Some(city), None) => Some(city),
                _ => None,
            })
            .unwrap_or_else(|| place.to_string());

        Ok(ResolvedLocation {
            id: format!("{}/{},{}", props.grid_id, props.grid_x, props.grid_y),
            name,
            country: None,
            coordinates: Some(coordinates),
        })
    }

    async fn fetch_periods(
        &self,
        location: &ResolvedLocation,
        units: Units,
    ) -> Result<Vec<ForecastPeriod>, WeatherError> {
        let url = format!("{}/gridpoints/{}/forecast/hourly", self.base_url, location.id);
        let nws_units = if units.is_metric() { "si" } else { "us" };

        let forecast = self
            .http
            .get_json::<ForecastResponse>(&url, &[("units", nws_units)])
            .await
            .map_err(Self::upstream)?;

        let periods = forecast.properties.map(|p| p.periods).unwrap_or_default();
        if periods.is_empty() {
            return Err(Self::upstream(UpstreamError::Malformed(
                "no hourly forecast data available".to_string(),
            )));
        }

        Ok(periods)
    }

    fn current_from(period: &ForecastPeriod, units: Units) -> CurrentConditions {
        CurrentConditions {
            temperature: format_temperature(period.temperature, &temperature_unit(period, units)),
            weather_text: text(period.short_forecast.clone()),
            relative_humidity: percent(period.relative_humidity.as_ref().and_then(|q| q.value)),
            wind_speed: wind_speed(period, units),
            wind_direction: text(period.wind_direction.clone()),
            precipitation: Reading::Unavailable,
            precipitation_type: Reading::Unavailable,
            observation_time: text(period.start_time.clone()),
        }
    }

    fn hourly_from(periods: &[ForecastPeriod], units: Units, hours: usize) -> Vec<HourlyForecast> {
        periods
            .iter()
            .skip(1)
            .take(hours)
            .zip(1u32..)
            .map(|(period, offset)| HourlyForecast {
                relative_time: format_relative_time(offset),
                offset_hours: offset,
                forecast_time: text(period.start_time.clone()),
                temperature: format_temperature(
                    period.temperature,
                    &temperature_unit(period, units),
                ),
                weather_text: text(period.short_forecast.clone()),
                relative_humidity: percent(
                    period.relative_humidity.as_ref().and_then(|q| q.value),
                ),
                wind_speed: wind_speed(period, units),
                wind_direction: text(period.wind_direction.clone()),
                precipitation_probability: percent(
                    period.probability_of_precipitation.as_ref().and_then(|q| q.value),
                ),
                precipitation_type: Reading::Unavailable,
                precipitation_intensity: Reading::Unavailable,
            })
            .collect()
    }
}

fn wind_speed(period: &ForecastPeriod, units: Units) -> Measurement<f64> {
    period
        .wind_speed
        .as_deref()
        .and_then(parse_wind_speed)
        .unwrap_or_else(|| Measurement {
            value: Reading::Unavailable,
            unit: if units.is_metric() { "km/h" } else { "mph" }.to_string(),
        })
}

fn temperature_unit(period: &ForecastPeriod, units: Units) -> String {
    period
        .temperature_unit
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| units.temperature_symbol().to_string())
}

#[async_trait]
impl WeatherProvider for WeatherGovClient {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherGov
    }

    async fn resolve(&self, place: &str) -> Result<ResolvedLocation, WeatherError> {
        if let Some(cached) = self.cache.get(ProviderId::WeatherGov, place).await {
            tracing::debug!("Location cache hit for '{}': {}", place, cached.id);
            return Ok(cached);
        }

        let coordinates = self.geocode(place).await?;
        let location = self.lookup_grid(place, coordinates).await?;

        if let Err(e) = self.cache.put(ProviderId::WeatherGov, place, &location).await {
            tracing::warn!("Failed to cache location key: {}", e);
        }
        Ok(location)
    }

    async fn get_current_conditions(
        &self,
        location: &ResolvedLocation,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        let periods = self.fetch_periods(location, units).await?;
        Ok(Self::current_from(&periods[0], units))
    }

    async fn get_hourly_forecast(
        &self,
        location: &ResolvedLocation,
        units: Units,
        hours: usize,
    ) -> Result<Vec<HourlyForecast>, WeatherError> {
        let periods = self.fetch_periods(location, units).await?;
        Ok(Self::hourly_from(&periods, units, hours))
    }

    /// One forecast request serves both current conditions and the forecast
    async fn get_hourly_weather(
        &self,
        place: &str,
        units: Units,
    ) -> Result<WeatherReport, WeatherError> {
        let place = validate_location(place)?;
        let location = self.resolve(place).await?;
        let periods = self.fetch_periods(&location, units).await?;

        Ok(WeatherReport {
            location: location.label(),
            source: ProviderId::WeatherGov.display_name().to_string(),
            current_conditions: Self::current_from(&periods[0], units),
            hourly_forecast: Self::hourly_from(&periods, units, DEFAULT_FORECAST_HOURS),
        })
    }
}
