//! MCP server exposing current conditions and a 12-hour forecast from
//! Weather.gov or AccuWeather, normalized into one response shape.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod http;
pub mod models;
pub mod providers;
pub mod service;
pub mod transport;

pub use cache::LocationCache;
pub use config::WeatherConfig;
pub use error::{UpstreamError, WeatherError};
pub use models::{Units, WeatherReport};
pub use providers::{create_provider, ProviderId, WeatherProvider};
pub use service::Weather;
