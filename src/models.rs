use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::UNAVAILABLE;
use crate::providers::ProviderId;

// ============================================================================
// Normalized Weather Models
// ============================================================================

/// A field copied from an upstream payload.
///
/// Missing upstream data serializes as the string `"unavailable"` so the
/// response schema never loses a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Available(T),
    Unavailable,
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Unavailable, Reading::Available)
    }
}

impl<T: Serialize> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Available(value) => value.serialize(serializer),
            Reading::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

/// A numeric value paired with the unit the provider reported it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement<T> {
    pub value: Reading<T>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: Measurement<i64>,
    pub weather_text: Reading<String>,
    /// Percent, as a bare number
    pub relative_humidity: Reading<u8>,
    pub wind_speed: Measurement<f64>,
    pub wind_direction: Reading<String>,
    pub precipitation: Reading<bool>,
    pub precipitation_type: Reading<String>,
    pub observation_time: Reading<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    /// "+1 hour", "+2 hours", ...
    pub relative_time: String,
    pub offset_hours: u32,
    pub forecast_time: Reading<String>,
    pub temperature: Measurement<i64>,
    pub weather_text: Reading<String>,
    pub relative_humidity: Reading<u8>,
    pub wind_speed: Measurement<f64>,
    pub wind_direction: Reading<String>,
    pub precipitation_probability: Reading<u8>,
    pub precipitation_type: Reading<String>,
    pub precipitation_intensity: Reading<String>,
}

/// The canonical response of `get_hourly_weather`, identical in shape for
/// every provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub source: String,
    pub current_conditions: CurrentConditions,
    pub hourly_forecast: Vec<HourlyForecast>,
}

// ============================================================================
// Location Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A place name resolved to a provider-specific identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Opaque to everything but the provider that produced it
    pub id: String,
    /// Human-readable label used as the report's `location`
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl ResolvedLocation {
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Fahrenheit, miles per hour
    #[default]
    Imperial,
    /// Celsius, kilometers per hour
    Metric,
}

impl Units {
    pub fn is_metric(self) -> bool {
        self == Units::Metric
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Units::Imperial => "F",
            Units::Metric => "C",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetHourlyWeatherRequest {
    /// Place name, e.g. "Washington, DC" or "Huntsville, AL"
    pub location: String,
    /// "imperial" (default) or "metric"
    #[serde(default)]
    pub units: Units,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ClearWeatherCacheRequest {
    /// Provider whose cache to clear; defaults to the configured provider
    #[serde(default)]
    pub source: Option<ProviderId>,
}
