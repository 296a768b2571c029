use super::error::AppError;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of inverters in the plant.
pub const INVERTER_COUNT: u8 = 8;

/// Identifier of a physical inverter, 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct InverterId(u8);

impl InverterId {
    pub fn new(id: u8) -> Result<Self, AppError> {
        if (1..=INVERTER_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(AppError::InvalidInverter(id))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based column position.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All inverters in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=INVERTER_COUNT).map(Self)
    }
}

impl TryFrom<u8> for InverterId {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InverterId> for u8 {
    fn from(id: InverterId) -> Self {
        id.0
    }
}

impl std::fmt::Display for InverterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "INV/{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionFeatures {
    #[serde(default)]
    pub direct_radiation: f64,
}

/// One point of a model forecast for a single inverter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub prediction_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub predicted_power: f64,
    #[serde(default)]
    pub features: PredictionFeatures,
}

/// Accepts RFC3339 timestamps as well as naive ones, which are taken as UTC
fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(serde::de::Error::custom(format!(
        "Failed to parse datetime '{s}'"
    )))
}

/// Model quality figures for one inverter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverterMetrics {
    pub r2: f64,
    pub mae: f64,
}

impl InverterMetrics {
    pub fn r2_percent(&self) -> f64 {
        self.r2 * 100.0
    }
}

/// Body returned by `GET /api/models/metrics/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricsResponse {
    pub metrics: InverterMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InverterHour {
    pub prediction: f64,
    pub radiation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyProduction {
    pub hour: u32,
    pub inverters: [InverterHour; INVERTER_COUNT as usize],
}

impl HourlyProduction {
    pub fn total_prediction(&self) -> f64 {
        self.inverters.iter().map(|i| i.prediction).sum()
    }

    pub fn total_radiation(&self) -> f64 {
        self.inverters.iter().map(|i| i.radiation).sum()
    }
}

/// Forecast for the next 24 hours aggregated per hour of day (UTC).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyProduction {
    pub hourly: Vec<HourlyProduction>,
}

impl DailyProduction {
    pub fn from_predictions(predictions: &BTreeMap<InverterId, Vec<Prediction>>) -> Self {
        let hourly = (0..24)
            .map(|hour| {
                let mut inverters = [InverterHour::default(); INVERTER_COUNT as usize];
                for id in InverterId::all() {
                    let matching = predictions.get(&id).and_then(|points| {
                        points
                            .iter()
                            .find(|p| p.prediction_timestamp.hour() == hour)
                    });
                    if let Some(point) = matching {
                        inverters[id.index()] = InverterHour {
                            prediction: point.predicted_power,
                            radiation: point.features.direct_radiation,
                        };
                    }
                }
                HourlyProduction { hour, inverters }
            })
            .collect();

        Self { hourly }
    }

    pub fn daily_total(&self) -> f64 {
        self.hourly.iter().map(HourlyProduction::total_prediction).sum()
    }

    pub fn series_data(&self) -> (Vec<String>, Vec<f64>) {
        let labels = self
            .hourly
            .iter()
            .map(|h| format!("{:02}:00", h.hour))
            .collect();
        let values = self
            .hourly
            .iter()
            .map(HourlyProduction::total_prediction)
            .collect();
        (labels, values)
    }
}

/// Headline production figures derived from the daily forecast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProductionMetrics {
    pub daily_total: f64,
    pub daily_average: f64,
    pub monthly_production: f64,
}

impl ProductionMetrics {
    pub fn from_daily_total(daily_total: f64) -> Self {
        Self {
            daily_total,
            daily_average: daily_total / 24.0,
            monthly_production: daily_total * 30.0,
        }
    }
}
