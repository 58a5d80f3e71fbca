use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    /// Probability of precipitation, 0.0..=1.0.
    pub precip_probability: f64,
    pub description: String,
}

/// Forecast for a resolved location, slots ordered by time.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub location_name: String,
    pub observations: Vec<Observation>,
}

/// Hiking thresholds supplied with a request.
///
/// Absent values fall back to bounds no realistic forecast can violate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "PreferencesInput")]
pub struct Preferences {
    pub max_temp: f64,
    pub min_temp: f64,
    pub max_wind: f64,
    /// Fraction 0.0..=1.0, same scale as [`Observation::precip_probability`].
    pub max_precip: f64,
}

impl Preferences {
    pub const DEFAULT_MAX_TEMP: f64 = 100.0;
    pub const DEFAULT_MIN_TEMP: f64 = -100.0;
    pub const DEFAULT_MAX_WIND: f64 = 100.0;
    pub const DEFAULT_MAX_PRECIP: f64 = 1.0;
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_temp: Self::DEFAULT_MAX_TEMP,
            min_temp: Self::DEFAULT_MIN_TEMP,
            max_wind: Self::DEFAULT_MAX_WIND,
            max_precip: Self::DEFAULT_MAX_PRECIP,
        }
    }
}

/// Wire shape of the preferences object. The web form posts its fields as
/// strings, so every threshold accepts a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesInput {
    #[serde(default, deserialize_with = "lenient_threshold")]
    max_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_threshold")]
    min_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_threshold")]
    max_wind: Option<f64>,
    #[serde(default, deserialize_with = "lenient_threshold")]
    max_precip: Option<f64>,
}

impl From<PreferencesInput> for Preferences {
    fn from(input: PreferencesInput) -> Self {
        let defaults = Preferences::default();
        Self {
            max_temp: input.max_temp.unwrap_or(defaults.max_temp),
            min_temp: input.min_temp.unwrap_or(defaults.min_temp),
            max_wind: input.max_wind.unwrap_or(defaults.max_wind),
            max_precip: input.max_precip.unwrap_or(defaults.max_precip),
        }
    }
}

fn lenient_threshold<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("'{text}' is not a number")))
        }
    }
}
