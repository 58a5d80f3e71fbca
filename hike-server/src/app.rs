use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use chrono::Local;
use hike_core::{DaySummary, ForecastProvider, Preferences, summarize_days};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
}

/// Validated body of a forecast request.
#[derive(Debug)]
pub struct HikeForecastRequest {
    pub location: String,
    pub preferences: Preferences,
    /// The preferences object exactly as sent, echoed back to the client.
    pub preferences_raw: Value,
}

impl HikeForecastRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let data: Map<String, Value> = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) if !map.is_empty() => map,
            _ => return Err(ApiError::MissingBody),
        };

        let location = data
            .get("location")
            .and_then(Value::as_str)
            .filter(|location| !location.is_empty())
            .ok_or(ApiError::MissingLocation)?
            .to_string();

        let preferences_raw = match data.get("preferences") {
            None | Some(Value::Null) => json!({}),
            Some(raw) => raw.clone(),
        };
        let preferences = Preferences::deserialize(&preferences_raw)
            .map_err(|err| ApiError::InvalidPreferences(err.to_string()))?;

        Ok(Self { location, preferences, preferences_raw })
    }
}

#[derive(Debug, Serialize)]
pub struct HikeForecastResponse {
    pub location_name: String,
    pub daily_summary: BTreeMap<String, DaySummary>,
    pub preferences_used: Value,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/get_hike_forecast", post(get_hike_forecast))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_hike_forecast(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HikeForecastResponse>, ApiError> {
    let request = HikeForecastRequest::from_body(&body)?;
    info!(location = %request.location, "hike forecast requested");

    let forecast = state.provider.fetch_forecast(&request.location).await.map_err(|err| {
        warn!(location = %request.location, error = %err, "forecast lookup failed");
        err
    })?;

    let daily_summary = summarize_days(&forecast.observations, &request.preferences, &Local);
    info!(
        location = %forecast.location_name,
        slots = forecast.observations.len(),
        days = daily_summary.len(),
        "hike forecast evaluated"
    );

    Ok(Json(HikeForecastResponse {
        location_name: forecast.location_name,
        daily_summary,
        preferences_used: request.preferences_raw,
    }))
}
