//! Core library for the hiking forecast service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The forecast provider abstraction and its OpenWeatherMap client
//! - Per-slot preference evaluation and per-day aggregation
//!
//! It is used by `hike-server`, but has no HTTP server dependencies of its own.

pub mod config;
pub mod evaluate;
pub mod model;
pub mod provider;
pub mod summary;

pub use config::{Config, ProviderConfig, ServerConfig};
pub use evaluate::{Verdict, evaluate};
pub use model::{Forecast, Observation, Preferences};
pub use provider::{FetchError, ForecastProvider, provider_from_config};
pub use summary::{DaySummary, Recommendation, SlotVerdict, summarize_days};
