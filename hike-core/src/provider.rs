use crate::{Config, Forecast, provider::openweather::OpenWeatherProvider};
use anyhow::Context;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;

/// Ways a forecast lookup can fail. Every variant ends the request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Server configuration error: Missing API Key")]
    MissingCredential,

    #[error("Could not fetch weather data: {0}")]
    RequestFailed(String),

    #[error("Unexpected API response format from OpenWeatherMap")]
    UnexpectedSchema,

    #[error("An unexpected error occurred")]
    Unexpected(#[source] reqwest::Error),
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Multi-day, 3-hour resolution forecast for a free-text location.
    async fn fetch_forecast(&self, location: &str) -> Result<Forecast, FetchError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here; requests fail with
/// [`FetchError::MissingCredential`] until one is configured.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let settings = &config.openweather;

    if settings.api_key().is_none() {
        tracing::warn!("no OpenWeather API key configured; forecast requests will fail");
    }

    let provider = OpenWeatherProvider::new(
        settings.api_key().map(str::to_owned),
        &settings.base_url,
        Duration::from_secs(settings.timeout_secs),
    )
    .context("Failed to build OpenWeather HTTP client")?;

    Ok(Arc::new(provider))
}
