//! Helpers shared by the provider clients when mapping upstream payloads into
//! the normalized report.

use crate::error::WeatherError;
use crate::models::{Measurement, Reading};

/// Rejects place names that should never be sent upstream
pub fn validate_location(location: &str) -> Result<&str, WeatherError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::Validation(
            "Location parameter is required and cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Formats a temperature as `{value, unit}`, rounded to whole degrees
pub fn format_temperature(value: Option<f64>, unit: &str) -> Measurement<i64> {
    Measurement {
        value: value.map(|v| v.round() as i64).into(),
        unit: unit.to_string(),
    }
}

/// Formats the offset of an hourly entry ("+1 hour", "+2 hours", ...)
pub fn format_relative_time(hour_offset: u32) -> String {
    if hour_offset == 1 {
        "+1 hour".to_string()
    } else {
        format!("+{} hours", hour_offset)
    }
}

/// Converts a provider percentage to a bare number
pub fn percent(value: Option<f64>) -> Reading<u8> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .into()
}

/// Treats blank strings the same as missing ones
pub fn text(value: Option<String>) -> Reading<String> {
    value.filter(|s| !s.trim().is_empty()).into()
}

/// Parses Weather.gov wind strings such as "10 mph" or "5 to 10 mph".
///
/// Ranges keep their upper bound.
pub fn parse_wind_speed(raw: &str) -> Option<Measurement<f64>> {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    let unit = tokens.pop()?;
    if unit.parse::<f64>().is_ok() {
        return None;
    }
    let value = tokens.iter().rev().find_map(|t| t.parse::<f64>().ok())?;

    Some(Measurement {
        value: Reading::Available(value),
        unit: unit.to_string(),
    })
}
