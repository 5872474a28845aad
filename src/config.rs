use directories::ProjectDirs;
use std::path::PathBuf;

use crate::constants::{ACCUWEATHER_API_BASE, NOMINATIM_API_BASE, NWS_API_BASE};
use crate::error::WeatherError;
use crate::providers::ProviderId;

pub const WEATHER_SOURCE_VAR: &str = "WEATHER_SOURCE";
pub const ACCUWEATHER_API_KEY_VAR: &str = "ACCUWEATHER_API_KEY";
pub const WEATHER_CACHE_DIR_VAR: &str = "WEATHER_CACHE_DIR";

/// Base URLs of the upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub weathergov: String,
    pub nominatim: String,
    pub accuweather: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weathergov: NWS_API_BASE.to_string(),
            nominatim: NOMINATIM_API_BASE.to_string(),
            accuweather: ACCUWEATHER_API_BASE.to_string(),
        }
    }
}

/// Everything the provider factory needs, read once at startup.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub source: ProviderId,
    pub accuweather_api_key: Option<String>,
    /// Overrides the platform cache directory
    pub cache_dir: Option<PathBuf>,
    pub endpoints: Endpoints,
}

impl WeatherConfig {
    pub fn new(source: ProviderId) -> Self {
        Self {
            source,
            accuweather_api_key: None,
            cache_dir: None,
            endpoints: Endpoints::default(),
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, WeatherError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `WEATHER_SOURCE` defaults to `weathergov`; unknown values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match lookup(WEATHER_SOURCE_VAR) {
            Some(raw) if !raw.trim().is_empty() => ProviderId::try_from(raw.as_str())?,
            _ => ProviderId::WeatherGov,
        };

        let mut config = Self::new(source);
        config.accuweather_api_key = lookup(ACCUWEATHER_API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        config.cache_dir = lookup(WEATHER_CACHE_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Root directory of the location cache, always `<cache dir>/locations`
    pub fn cache_root(&self) -> Result<PathBuf, WeatherError> {
        let base = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("", "", "mcp-weather")
                .ok_or_else(|| {
                    WeatherError::Configuration(format!(
                        "could not determine a cache directory; set {}",
                        WEATHER_CACHE_DIR_VAR
                    ))
                })?
                .cache_dir()
                .to_path_buf(),
        };

        Ok(base.join("locations"))
    }
}
