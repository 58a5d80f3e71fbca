//! Rolls per-slot verdicts up into one summary per calendar day.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use chrono::TimeZone;
use serde::Serialize;

use crate::{
    evaluate::evaluate,
    model::{Observation, Preferences},
};

/// Day-level call: a single unacceptable slot is enough to flag the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Good,
    #[serde(rename = "Potentially Bad")]
    PotentiallyBad,
}

/// One evaluated slot as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotVerdict {
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    #[serde(rename = "temp_c")]
    pub temperature_c: f64,
    pub description: String,
    #[serde(rename = "wind_mps")]
    pub wind_speed_mps: f64,
    /// Precipitation probability as a percentage, 0..=100.
    #[serde(rename = "precip_prob")]
    pub precip_pct: f64,
    #[serde(rename = "is_good_period")]
    pub acceptable: bool,
    /// Failure reason; empty for acceptable slots.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub good_periods: usize,
    pub total_periods: usize,
    pub details: Vec<SlotVerdict>,
    pub overall_good: bool,
    pub reasons_bad: BTreeSet<String>,
    pub recommendation: Recommendation,
}

impl DaySummary {
    fn new() -> Self {
        Self {
            good_periods: 0,
            total_periods: 0,
            details: Vec::new(),
            overall_good: true,
            reasons_bad: BTreeSet::new(),
            recommendation: Recommendation::Good,
        }
    }
}

/// Evaluates every observation and groups the verdicts by calendar date in
/// `tz`. Keys are `YYYY-MM-DD`, so map order is chronological.
pub fn summarize_days<Tz>(
    observations: &[Observation],
    prefs: &Preferences,
    tz: &Tz,
) -> BTreeMap<String, DaySummary>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut days: BTreeMap<String, DaySummary> = BTreeMap::new();

    for observation in observations {
        let local = observation.timestamp.with_timezone(tz);
        let date = local.format("%Y-%m-%d").to_string();
        let day = days.entry(date).or_insert_with(DaySummary::new);

        let verdict = evaluate(observation, prefs);

        day.total_periods += 1;
        if verdict.acceptable {
            day.good_periods += 1;
        } else {
            day.overall_good = false;
            day.recommendation = Recommendation::PotentiallyBad;
            day.reasons_bad.insert(verdict.category().to_string());
        }

        day.details.push(SlotVerdict {
            time: local.format("%H:%M").to_string(),
            temperature_c: observation.temperature_c,
            description: observation.description.clone(),
            wind_speed_mps: observation.wind_speed_mps,
            precip_pct: observation.precip_probability * 100.0,
            acceptable: verdict.acceptable,
            reason: if verdict.acceptable { String::new() } else { verdict.reason },
        });
    }

    for (date, day) in &days {
        tracing::debug!(
            %date,
            good = day.good_periods,
            total = day.total_periods,
            "day summarized"
        );
    }

    days
}
