//! Per-slot classification against a user's hiking thresholds.

use crate::model::{Observation, Preferences};

pub const CONDITIONS_MET: &str = "Conditions Met";

/// Outcome of checking one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub acceptable: bool,
    pub reason: String,
}

impl Verdict {
    fn pass() -> Self {
        Self { acceptable: true, reason: CONDITIONS_MET.to_string() }
    }

    fn fail(reason: String) -> Self {
        Self { acceptable: false, reason }
    }

    /// Short form of the reason: everything before the first `" ("`.
    pub fn category(&self) -> &str {
        self.reason.split_once(" (").map_or(self.reason.as_str(), |(head, _)| head)
    }
}

/// Checks temperature, wind and precipitation in that order. Bounds are
/// inclusive and only the first violated threshold is reported.
pub fn evaluate(observation: &Observation, prefs: &Preferences) -> Verdict {
    let temp = observation.temperature_c;
    if !(prefs.min_temp..=prefs.max_temp).contains(&temp) {
        return Verdict::fail(format!(
            "Temp {temp:.1}°C outside range ({}-{}°C)",
            threshold(prefs.min_temp),
            threshold(prefs.max_temp),
        ));
    }

    let wind = observation.wind_speed_mps;
    if wind > prefs.max_wind {
        return Verdict::fail(format!(
            "Wind {wind:.1} m/s too high (max {} m/s)",
            threshold(prefs.max_wind),
        ));
    }

    let pop = observation.precip_probability;
    if pop > prefs.max_precip {
        return Verdict::fail(format!(
            "Precipitation chance {:.0}% too high (max {:.0}%)",
            pop * 100.0,
            prefs.max_precip * 100.0,
        ));
    }

    Verdict::pass()
}

/// Renders a threshold the way users typed it, but always with a decimal
/// point: `10` -> `10.0`, `12.5` -> `12.5`.
fn threshold(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
