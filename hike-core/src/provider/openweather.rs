use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{Forecast, Observation};

use super::{FetchError, ForecastProvider};

/// Client for the OpenWeatherMap 5 day / 3 hour forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    wind: OwWind,
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

/// Error payload OpenWeather sends with non-2xx statuses, e.g.
/// `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct OwError {
    message: Option<String>,
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn fetch_forecast(&self, location: &str) -> Result<Forecast, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingCredential)?;
        let url = format!("{}/data/2.5/forecast", self.base_url);

        tracing::debug!(%location, "requesting OpenWeather forecast");

        let res = self
            .http
            .get(&url)
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(request_error)?;

        let status = res.status();
        let body = res.text().await.map_err(request_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwError>(&body)
                .ok()
                .and_then(|err| err.message)
                .unwrap_or_else(|| {
                    format!("request failed with status {}: {}", status, truncate_body(&body))
                });
            return Err(FetchError::RequestFailed(message));
        }

        parse_forecast(&body, location)
    }
}

fn parse_forecast(body: &str, location: &str) -> Result<Forecast, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|err| FetchError::RequestFailed(format!("invalid JSON in response: {err}")))?;

    if value.get("list").is_none() {
        return Err(FetchError::UnexpectedSchema);
    }

    let parsed: OwForecastResponse = serde_json::from_value(value).map_err(|err| {
        tracing::warn!(error = %err, "OpenWeather forecast entries did not match expected shape");
        FetchError::UnexpectedSchema
    })?;

    let observations = parsed
        .list
        .into_iter()
        .map(|entry| {
            let timestamp: DateTime<Utc> =
                DateTime::from_timestamp(entry.dt, 0).ok_or(FetchError::UnexpectedSchema)?;

            let description = entry
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_else(|| "Unknown".to_string());

            Ok(Observation {
                timestamp,
                temperature_c: entry.main.temp,
                wind_speed_mps: entry.wind.speed,
                precip_probability: entry.pop,
                description,
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    let location_name = parsed
        .city
        .and_then(|city| city.name)
        .unwrap_or_else(|| location.to_string());

    Ok(Forecast { location_name, observations })
}

/// The URL carries the API key, so it is stripped before the error text can
/// reach a client.
fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::Unexpected(err.without_url())
    } else {
        FetchError::RequestFailed(err.without_url().to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, key: Option<&str>) -> OpenWeatherProvider {
        OpenWeatherProvider::new(key.map(str::to_owned), &server.uri(), Duration::from_secs(5))
            .expect("client builds")
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "cod": "200",
            "city": { "name": "Boulder", "country": "US" },
            "list": [
                {
                    "dt": 1717200000,
                    "main": { "temp": 18.2, "feels_like": 17.0, "humidity": 40 },
                    "wind": { "speed": 3.1 },
                    "pop": 0.2,
                    "weather": [{ "description": "few clouds" }]
                },
                {
                    "dt": 1717210800,
                    "main": { "temp": 21.0 },
                    "wind": { "speed": 4.5 },
                    "weather": []
                }
            ]
        })
    }

    #[tokio::test]
    async fn fetches_and_maps_forecast_slots() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Boulder"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let forecast = provider(&server, Some("KEY")).fetch_forecast("Boulder").await.unwrap();

        assert_eq!(forecast.location_name, "Boulder");
        assert_eq!(forecast.observations.len(), 2);

        let first = &forecast.observations[0];
        assert_eq!(first.timestamp.timestamp(), 1717200000);
        assert_eq!(first.temperature_c, 18.2);
        assert_eq!(first.wind_speed_mps, 3.1);
        assert_eq!(first.precip_probability, 0.2);
        assert_eq!(first.description, "few clouds");

        let second = &forecast.observations[1];
        assert_eq!(second.precip_probability, 0.0);
        assert_eq!(second.description, "Unknown");
    }

    #[tokio::test]
    async fn falls_back_to_query_when_city_missing() {
        let server = MockServer::start().await;
        let mut body = forecast_body();
        body.as_object_mut().unwrap().remove("city");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let forecast = provider(&server, Some("KEY")).fetch_forecast("somewhere").await.unwrap();

        assert_eq!(forecast.location_name, "somewhere");
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_provider() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider(&server, None).fetch_forecast("Boulder").await.unwrap_err();

        assert!(matches!(err, FetchError::MissingCredential));
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).fetch_forecast("Atlantis").await.unwrap_err();

        assert!(matches!(&err, FetchError::RequestFailed(msg) if msg == "city not found"));
        assert_eq!(err.to_string(), "Could not fetch weather data: city not found");
    }

    #[tokio::test]
    async fn non_json_error_body_reports_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).fetch_forecast("Boulder").await.unwrap_err();

        let msg = match err {
            FetchError::RequestFailed(msg) => msg,
            other => panic!("expected RequestFailed, got {other:?}"),
        };
        assert!(msg.contains("502"), "{msg}");
        assert!(msg.contains("bad gateway"), "{msg}");
    }

    #[tokio::test]
    async fn response_without_list_is_a_schema_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "city": { "name": "Boulder" } })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).fetch_forecast("Boulder").await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedSchema));
    }

    #[tokio::test]
    async fn malformed_entries_are_a_schema_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [{ "dt": 1717200000, "wind": { "speed": 1.0 } }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).fetch_forecast("Boulder").await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedSchema));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_request_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).fetch_forecast("Boulder").await.unwrap_err();

        assert!(matches!(err, FetchError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_request_failure_without_key_in_message() {
        let provider = OpenWeatherProvider::new(
            Some("SECRET".into()),
            "http://127.0.0.1:1",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider.fetch_forecast("Boulder").await.unwrap_err();

        let msg = match err {
            FetchError::RequestFailed(msg) => msg,
            other => panic!("expected RequestFailed, got {other:?}"),
        };
        assert!(!msg.contains("SECRET"), "{msg}");
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "x".repeat(250);
        let truncated = truncate_body(&long);

        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
