//! Health metric readings.
//!
//! # Invariants
//! - `unit` is always derived from `kind`.
//! - `value` is finite.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type HealthMetricId = Uuid;

/// Supported metric categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BloodPressure,
    HeartRate,
    Weight,
    Temperature,
    BloodGlucose,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        Self::BloodPressure,
        Self::HeartRate,
        Self::Weight,
        Self::Temperature,
        Self::BloodGlucose,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Self::BloodPressure => "mmHg",
            Self::HeartRate => "bpm",
            Self::Weight => "lbs",
            Self::Temperature => "°F",
            Self::BloodGlucose => "mg/dL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BloodPressure => "Blood Pressure",
            Self::HeartRate => "Heart Rate",
            Self::Weight => "Weight",
            Self::Temperature => "Temperature",
            Self::BloodGlucose => "Blood Glucose",
        }
    }

    /// Stable storage id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BloodPressure => "blood_pressure",
            Self::HeartRate => "heart_rate",
            Self::Weight => "weight",
            Self::Temperature => "temperature",
            Self::BloodGlucose => "blood_glucose",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// One recorded reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: HealthMetricId,
    pub kind: MetricKind,
    pub value: f64,
    pub unit: String,
    /// Unix epoch milliseconds.
    pub recorded_at: i64,
    pub notes: Option<String>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValidationError {
    NonFiniteValue(f64),
    UnitMismatch { kind: MetricKind, unit: String },
}

impl Display for MetricValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteValue(value) => write!(f, "metric value must be a number, got {value}"),
            Self::UnitMismatch { kind, unit } => write!(
                f,
                "unit `{unit}` does not match {} ({})",
                kind.label(),
                kind.unit()
            ),
        }
    }
}

impl Error for MetricValidationError {}

impl HealthMetric {
    pub fn new(kind: MetricKind, value: f64, recorded_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value,
            unit: kind.unit().to_string(),
            recorded_at,
            notes: None,
            doctor_name: None,
        }
    }

    pub fn validate(&self) -> Result<(), MetricValidationError> {
        if !self.value.is_finite() {
            return Err(MetricValidationError::NonFiniteValue(self.value));
        }
        if self.unit != self.kind.unit() {
            return Err(MetricValidationError::UnitMismatch {
                kind: self.kind,
                unit: self.unit.clone(),
            });
        }
        Ok(())
    }
}
