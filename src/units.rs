//! Unit normalization
//!
//! Pure conversions into the canonical basis used by every aggregate:
//! kilograms for weight, kilometers for distance. Progression increments
//! are also defined here since they depend on the display unit.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const KG_PER_LB: f64 = 0.453592;
const KM_PER_MILE: f64 = 1.60934;

/// ---------------------------------------------------------------------------
/// Weight
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
  Kg,
  Lb,
}

impl WeightUnit {
  /// Standard weight jump for an "increase weight" suggestion
  pub fn increment(self) -> f64 {
    match self {
      WeightUnit::Kg => 2.5,
      WeightUnit::Lb => 5.0,
    }
  }

  /// Rounding step applied to a deload target
  pub fn deload_step(self) -> f64 {
    match self {
      WeightUnit::Kg => 1.0,
      WeightUnit::Lb => 2.5,
    }
  }
}

impl std::fmt::Display for WeightUnit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      WeightUnit::Kg => write!(f, "kg"),
      WeightUnit::Lb => write!(f, "lb"),
    }
  }
}

impl std::str::FromStr for WeightUnit {
  type Err = EngineError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kg),
      "lb" | "lbs" | "pounds" => Ok(WeightUnit::Lb),
      other => Err(EngineError::UnknownWeightUnit(other.to_string())),
    }
  }
}

/// Convert a weight into kilograms
pub fn to_kilograms(value: f64, unit: WeightUnit) -> f64 {
  match unit {
    WeightUnit::Kg => value,
    WeightUnit::Lb => value * KG_PER_LB,
  }
}

/// ---------------------------------------------------------------------------
/// Distance
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
  Km,
  Mi,
  M,
}

impl std::fmt::Display for DistanceUnit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DistanceUnit::Km => write!(f, "km"),
      DistanceUnit::Mi => write!(f, "mi"),
      DistanceUnit::M => write!(f, "m"),
    }
  }
}

impl std::str::FromStr for DistanceUnit {
  type Err = EngineError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "km" | "kilometers" => Ok(DistanceUnit::Km),
      "mi" | "miles" => Ok(DistanceUnit::Mi),
      "m" | "meters" => Ok(DistanceUnit::M),
      other => Err(EngineError::UnknownDistanceUnit(other.to_string())),
    }
  }
}

/// Convert a distance into kilometers
pub fn to_kilometers(value: f64, unit: DistanceUnit) -> f64 {
  match unit {
    DistanceUnit::Km => value,
    DistanceUnit::Mi => value * KM_PER_MILE,
    DistanceUnit::M => value / 1000.0,
  }
}

/// Round a value to the nearest multiple of `step`
pub fn round_to_step(value: f64, step: f64) -> f64 {
  (value / step).round() * step
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
