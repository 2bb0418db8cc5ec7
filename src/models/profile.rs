use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::units::{to_kilograms, WeightUnit};

/// Bodyweight assumed for load math when the profile has none recorded
pub const DEFAULT_BODYWEIGHT_KG: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
  Beginner,
  Intermediate,
  Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id: i64,
  pub bodyweight: Option<f64>,
  pub bodyweight_unit: Option<WeightUnit>,
  pub goal: Option<String>,
  pub experience: Option<ExperienceLevel>,
  /// Target training days per week
  pub weekly_availability: Option<i64>,
}

impl Default for UserProfile {
  fn default() -> Self {
    Self {
      user_id: 0,
      bodyweight: None,
      bodyweight_unit: None,
      goal: None,
      experience: None,
      weekly_availability: None,
    }
  }
}

impl UserProfile {
  /// Bodyweight in kg, falling back to 70 kg if unset
  pub fn bodyweight_kg(&self) -> f64 {
    self
      .bodyweight
      .map(|w| to_kilograms(w, self.bodyweight_unit.unwrap_or(WeightUnit::Kg)))
      .unwrap_or(DEFAULT_BODYWEIGHT_KG)
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Swaps
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapReason {
  TooDifficult,
  EquipmentUnavailable,
  Discomfort,
  Preference,
  Other,
}

impl std::fmt::Display for SwapReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::TooDifficult => write!(f, "too_difficult"),
      Self::EquipmentUnavailable => write!(f, "equipment_unavailable"),
      Self::Discomfort => write!(f, "discomfort"),
      Self::Preference => write!(f, "preference"),
      Self::Other => write!(f, "other"),
    }
  }
}

impl std::str::FromStr for SwapReason {
  type Err = EngineError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "too_difficult" => Ok(Self::TooDifficult),
      "equipment_unavailable" => Ok(Self::EquipmentUnavailable),
      "discomfort" => Ok(Self::Discomfort),
      "preference" => Ok(Self::Preference),
      "other" => Ok(Self::Other),
      other => Err(EngineError::UnknownSwapReason(other.to_string())),
    }
  }
}

/// A user declining one exercise in favor of another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSwap {
  pub id: i64,
  pub user_id: i64,
  pub occurred_at: DateTime<Utc>,
  pub from_exercise: String,
  pub to_exercise: String,
  pub reason: SwapReason,
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
