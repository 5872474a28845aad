use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use std::sync::Arc;

use crate::cache::LocationCache;
use crate::error::WeatherError;
use crate::models::{ClearWeatherCacheRequest, GetHourlyWeatherRequest};
use crate::providers::WeatherProvider;

/// Main weather service that handles MCP requests
#[derive(Clone)]
pub struct Weather {
    provider: Arc<dyn WeatherProvider>,
    cache: LocationCache,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a service answering through the factory-selected provider
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: LocationCache) -> Self {
        Self {
            provider,
            cache,
            tool_router: Self::tool_router(),
        }
    }
}

/// Maps weather errors onto MCP error codes: bad input is `invalid_params`,
/// everything else is `internal_error`.
fn to_mcp_error(e: WeatherError) -> McpError {
    if e.is_user_error() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        McpError::internal_error(e.to_string(), None)
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(format!(
                "A weather information service backed by {}. \
                Provides current conditions and a 12-hour forecast for a place name.",
                self.provider.id().display_name()
            )),
        }
    }
}

#[tool_router]
impl Weather {
    /// Gets current conditions and the hourly forecast for a place name
    #[tool(description = "Get current weather conditions and 12-hour forecast for a location. Provide a place name (e.g., 'Washington, DC' or 'Huntsville, AL') and optionally units ('imperial' or 'metric', default 'imperial'). Check each temperature's 'unit' field; missing values are reported as 'unavailable'.")]
    async fn get_hourly_weather(
        &self,
        Parameters(request): Parameters<GetHourlyWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting hourly weather for location: {} ({:?})",
            request.location,
            request.units
        );

        let report = self
            .provider
            .get_hourly_weather(&request.location, request.units)
            .await
            .map_err(|e| {
                tracing::warn!("Weather lookup for '{}' failed: {}", request.location, e);
                to_mcp_error(e)
            })?;

        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }

    /// Clears cached location lookups
    #[tool(description = "Clear the location cache to force fresh API lookups. Optionally provide the source ('weathergov' or 'accuweather'); defaults to the configured source.")]
    async fn clear_weather_cache(
        &self,
        Parameters(request): Parameters<ClearWeatherCacheRequest>,
    ) -> Result<CallToolResult, McpError> {
        let source = request.source.unwrap_or_else(|| self.provider.id());
        tracing::info!("Clearing location cache for source: {}", source);

        let removed = self
            .cache
            .clear(source)
            .await
            .map_err(|e| to_mcp_error(e.into()))?;

        let message = if removed == 0 {
            format!("No cached {} locations found - cache is already empty", source)
        } else {
            format!(
                "Weather location cache cleared successfully ({} {} entries removed)",
                removed, source
            )
        };

        Ok(CallToolResult::success(vec![Content::text(message)]))
    }
}
