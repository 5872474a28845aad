//! Integration tests for the AccuWeather provider using wiremock.

use std::sync::Arc;

use mcp_weather::{
    create_provider, LocationCache, ProviderId, Units, UpstreamError, WeatherConfig,
    WeatherError, WeatherProvider,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test_api_key";
const LOCATION_KEY: &str = "331435";

fn provider(server: &MockServer, cache_dir: &TempDir) -> Arc<dyn WeatherProvider> {
    let mut config = WeatherConfig::new(ProviderId::AccuWeather);
    config.accuweather_api_key = Some(API_KEY.to_string());
    config.endpoints.accuweather = server.uri();
    create_provider(&config, LocationCache::new(cache_dir.path())).unwrap()
}

fn current_conditions() -> Value {
    json!([{
        "LocalObservationDateTime": "2023-01-01T12:00:00-06:00",
        "WeatherText": "Partly cloudy",
        "HasPrecipitation": false,
        "PrecipitationType": null,
        "Temperature": {
            "Imperial": {"Value": 75.0, "Unit": "F", "UnitType": 18},
            "Metric": {"Value": 24.0, "Unit": "C", "UnitType": 17}
        },
        "RelativeHumidity": 45,
        "Wind": {
            "Direction": {"Degrees": 203, "Localized": "SSW", "English": "SSW"},
            "Speed": {
                "Imperial": {"Value": 8.1, "Unit": "mi/h"},
                "Metric": {"Value": 13.0, "Unit": "km/h"}
            }
        }
    }])
}

fn hourly(hours: usize) -> Value {
    Value::Array(
        (0..hours)
            .map(|i| {
                json!({
                    "DateTime": format!("2023-01-01T{:02}:00:00-06:00", 13 + i),
                    "IconPhrase": "Mostly cloudy",
                    "Temperature": {"Value": 74 - i as i64, "Unit": "F", "UnitType": 18},
                    "RelativeHumidity": 50,
                    "Wind": {
                        "Speed": {"Value": 6.9, "Unit": "mi/h"},
                        "Direction": {"Localized": "S"}
                    },
                    "PrecipitationProbability": 10 * i,
                    "PrecipitationType": null,
                    "PrecipitationIntensity": null
                })
            })
            .collect(),
    )
}

async fn mount_search(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("apikey", API_KEY))
        .and(query_param("q", "Huntsville, AL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Key": LOCATION_KEY,
            "LocalizedName": "Huntsville",
            "Country": {"ID": "US", "LocalizedName": "United States"},
            "AdministrativeArea": {"ID": "AL", "LocalizedName": "Alabama"},
            "GeoPosition": {"Latitude": 34.73, "Longitude": -86.586}
        }])))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer, hours: usize) {
    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{}", LOCATION_KEY)))
        .and(query_param("apikey", API_KEY))
        .and(query_param("details", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/hourly/12hour/{}", LOCATION_KEY)))
        .and(query_param("apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(hourly(hours)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hourly_weather_for_huntsville() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;
    mount_weather(&server, 12).await;

    let report = provider(&server, &cache_dir)
        .get_hourly_weather("Huntsville, AL", Units::Imperial)
        .await
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 4);
    assert_eq!(value["source"], "AccuWeather");
    assert_eq!(value["location"], "Huntsville, United States");

    let current = &value["current_conditions"];
    assert_eq!(current["temperature"], json!({"value": 75, "unit": "F"}));
    assert_eq!(current["weather_text"], "Partly cloudy");
    assert_eq!(current["relative_humidity"], 45);
    assert_eq!(current["precipitation"], false);
    assert_eq!(current["precipitation_type"], "unavailable");
    assert_eq!(current["wind_speed"], json!({"value": 8.1, "unit": "mi/h"}));
    assert_eq!(current["observation_time"], "2023-01-01T12:00:00-06:00");

    assert_eq!(report.hourly_forecast.len(), 12);
    assert!(report
        .hourly_forecast
        .windows(2)
        .all(|w| w[0].offset_hours <= w[1].offset_hours));
    assert_eq!(value["hourly_forecast"][1]["relative_time"], "+2 hours");
    assert_eq!(value["hourly_forecast"][1]["temperature"], json!({"value": 73, "unit": "F"}));
    assert_eq!(value["hourly_forecast"][1]["precipitation_probability"], 10);
    assert_eq!(value["hourly_forecast"][0]["precipitation_intensity"], "unavailable");
}

#[tokio::test]
async fn test_resolution_is_cached() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;
    mount_weather(&server, 12).await;

    let provider = provider(&server, &cache_dir);
    let first = provider.resolve("Huntsville, AL").await.unwrap();
    let second = provider.resolve("HUNTSVILLE, AL").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id, LOCATION_KEY);

    // The cached metadata keeps the label stable without another search.
    let report = provider
        .get_hourly_weather("Huntsville, AL", Units::Imperial)
        .await
        .unwrap();
    assert_eq!(report.location, "Huntsville, United States");
}

#[tokio::test]
async fn test_clearing_cache_forces_new_search() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 2).await;

    let provider = provider(&server, &cache_dir);
    provider.resolve("Huntsville, AL").await.unwrap();

    let removed = LocationCache::new(cache_dir.path())
        .clear(ProviderId::AccuWeather)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    provider.resolve("Huntsville, AL").await.unwrap();
}

#[tokio::test]
async fn test_unknown_place_is_not_found() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server, &cache_dir)
        .get_hourly_weather("###notaplace###", Units::Imperial)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::LocationNotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_api_key() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "Code": "Unauthorized",
            "Message": "Api Authorization failed"
        })))
        .mount(&server)
        .await;

    let err = provider(&server, &cache_dir)
        .resolve("Huntsville, AL")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Upstream {
            provider: ProviderId::AccuWeather,
            cause: UpstreamError::Unauthorized,
        }
    ));
}

#[tokio::test]
async fn test_service_unavailable() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider(&server, &cache_dir)
        .get_hourly_weather("Huntsville, AL", Units::Imperial)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Upstream {
            cause: UpstreamError::Unavailable(_),
            ..
        }
    ));
    assert!(err.to_string().contains("temporarily unavailable"));
}

#[tokio::test]
async fn test_metric_units() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/hourly/12hour/{}", LOCATION_KEY)))
        .and(query_param("metric", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Temperature": {"Value": 23.4, "Unit": "C"}, "IconPhrase": "Cloudy", "PrecipitationProbability": 0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let report = provider(&server, &cache_dir)
        .get_hourly_weather("Huntsville, AL", Units::Metric)
        .await
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["current_conditions"]["temperature"], json!({"value": 24, "unit": "C"}));
    assert_eq!(value["current_conditions"]["wind_speed"]["unit"], "km/h");
    assert_eq!(value["hourly_forecast"][0]["temperature"], json!({"value": 23, "unit": "C"}));
    assert_eq!(report.hourly_forecast.len(), 1);
}

#[tokio::test]
async fn test_empty_current_conditions_keep_schema() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/hourly/12hour/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(hourly(3)))
        .mount(&server)
        .await;

    let report = provider(&server, &cache_dir)
        .get_hourly_weather("Huntsville, AL", Units::Imperial)
        .await
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    let current = value["current_conditions"].as_object().unwrap();
    assert_eq!(current.len(), 8);
    assert_eq!(current["temperature"], json!({"value": "unavailable", "unit": "F"}));
    assert_eq!(current["weather_text"], "unavailable");
    assert_eq!(report.hourly_forecast.len(), 3);
}

#[tokio::test]
async fn test_unparseable_forecast_is_upstream_error() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    mount_search(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_conditions()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/hourly/12hour/{}", LOCATION_KEY)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server, &cache_dir)
        .get_hourly_weather("Huntsville, AL", Units::Imperial)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Upstream {
            cause: UpstreamError::Malformed(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_failure_hides_api_key() {
    let cache_dir = TempDir::new().unwrap();
    let mut config = WeatherConfig::new(ProviderId::AccuWeather);
    config.accuweather_api_key = Some(API_KEY.to_string());
    config.endpoints.accuweather = "http://127.0.0.1:1".to_string();

    let err = create_provider(&config, LocationCache::new(cache_dir.path()))
        .unwrap()
        .resolve("Huntsville, AL")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Upstream {
            cause: UpstreamError::Network(_),
            ..
        }
    ));
    assert!(!err.to_string().contains(API_KEY));
}
