use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::units::{to_kilograms, DistanceUnit, WeightUnit};

/// Assumed session length when a workout was never explicitly completed
pub const DEFAULT_SESSION_MINUTES: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  InProgress,
  Completed,
  Cancelled,
}

impl std::fmt::Display for SessionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InProgress => write!(f, "in_progress"),
      Self::Completed => write!(f, "completed"),
      Self::Cancelled => write!(f, "cancelled"),
    }
  }
}

impl std::str::FromStr for SessionStatus {
  type Err = EngineError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(EngineError::UnknownSessionStatus(other.to_string())),
    }
  }
}

/// Denormalized totals captured when a session is closed out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
  pub total_volume_kg: Option<f64>,
  pub total_sets: Option<i64>,
  pub duration_minutes: Option<i64>,
  pub has_cardio_duration: bool,
  pub has_cardio_distance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
  pub id: i64,
  pub user_id: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub status: SessionStatus,
  pub summary: Option<SessionSummary>,
}

impl WorkoutSession {
  pub fn is_completed(&self) -> bool {
    self.status == SessionStatus::Completed
  }

  /// Session length in minutes, assuming an hour when completed_at is absent
  pub fn duration_minutes(&self) -> f64 {
    match self.completed_at {
      Some(completed) => (completed - self.started_at).num_seconds() as f64 / 60.0,
      None => DEFAULT_SESSION_MINUTES,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Log Entries
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftingSet {
  /// Caller-supplied ordinal; not validated monotonic
  pub set_number: i64,
  pub reps: Option<i64>,
  pub weight: Option<f64>,
  pub weight_unit: Option<WeightUnit>,
  pub rpe: Option<f64>,
  #[serde(default)]
  pub warm_up: bool,
  #[serde(default)]
  pub bodyweight: bool,
}

impl LiftingSet {
  /// Recorded weight in kilograms (unit defaults to kg when unspecified)
  pub fn weight_kg(&self) -> Option<f64> {
    self
      .weight
      .map(|w| to_kilograms(w, self.weight_unit.unwrap_or(WeightUnit::Kg)))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardioEntry {
  pub duration_seconds: i64,
  pub distance: Option<f64>,
  pub distance_unit: Option<DistanceUnit>,
  pub rpe: Option<f64>,
  pub intensity: Option<f64>,
  /// Weighted-vest load, if any
  pub added_weight: Option<f64>,
  pub added_weight_unit: Option<WeightUnit>,
}

impl CardioEntry {
  pub fn duration_minutes(&self) -> f64 {
    self.duration_seconds as f64 / 60.0
  }

  pub fn distance_km(&self) -> Option<f64> {
    self
      .distance
      .map(|d| crate::units::to_kilometers(d, self.distance_unit.unwrap_or(DistanceUnit::Km)))
  }

  /// Perceived effort: RPE, then intensity, then a neutral 5
  pub fn effort(&self) -> f64 {
    self.rpe.or(self.intensity).unwrap_or(5.0)
  }

  pub fn vest_kg(&self) -> f64 {
    self
      .added_weight
      .map(|w| to_kilograms(w, self.added_weight_unit.unwrap_or(WeightUnit::Kg)))
      .unwrap_or(0.0)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobilityEntry {
  pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
  Lifting(LiftingSet),
  Cardio(CardioEntry),
  Mobility(MobilityEntry),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
  pub id: i64,
  pub session_id: i64,
  pub user_id: i64,
  pub exercise: String,
  pub logged_at: DateTime<Utc>,
  #[serde(flatten)]
  pub entry: EntryKind,
}

impl LogEntry {
  pub fn as_lifting(&self) -> Option<&LiftingSet> {
    match &self.entry {
      EntryKind::Lifting(set) => Some(set),
      _ => None,
    }
  }

  pub fn as_cardio(&self) -> Option<&CardioEntry> {
    match &self.entry {
      EntryKind::Cardio(cardio) => Some(cardio),
      _ => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
