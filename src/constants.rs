/// User agent string for HTTP requests (Nominatim and Weather.gov both require one)
pub const USER_AGENT: &str = "mcp-weather/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Nominatim (OpenStreetMap) geocoding base URL
pub const NOMINATIM_API_BASE: &str = "https://nominatim.openstreetmap.org";

/// AccuWeather data service base URL
pub const ACCUWEATHER_API_BASE: &str = "http://dataservice.accuweather.com";

/// Number of hourly entries returned by `get_hourly_weather`
pub const DEFAULT_FORECAST_HOURS: usize = 12;

/// Marker serialized in place of a field the upstream provider did not return
pub const UNAVAILABLE: &str = "unavailable";

/// Longest upstream error body echoed back in error messages
pub const MAX_ERROR_BODY: usize = 200;
