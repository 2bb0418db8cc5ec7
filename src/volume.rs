//! Volume & load aggregation
//!
//! Turns raw log entries into per-muscle set volume, MET-based cardio load,
//! and the unified training-load score that blends lifting and cardio. All
//! functions are pure folds over the supplied snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::exercises::ExerciseCatalog;
use crate::models::{CardioEntry, LogEntry, UserProfile, WorkoutSession};

/// ---------------------------------------------------------------------------
/// MET Table
/// ---------------------------------------------------------------------------

/// MET value applied when a cardio modality is missing or unrecognized
pub const DEFAULT_MET: f64 = 6.0;

const MET_TABLE: &[(&str, f64)] = &[
  ("running", 9.8),
  ("cycling", 7.5),
  ("rowing", 7.0),
  ("swimming", 8.0),
  ("walking", 3.5),
  ("hiking", 5.3),
  ("elliptical", 5.0),
  ("stair_climbing", 9.0),
  ("jump_rope", 11.0),
];

/// Base MET for a cardio modality tag
pub fn base_met(modality: Option<&str>) -> f64 {
  modality
    .and_then(|tag| {
      let tag = tag.trim().to_lowercase();
      MET_TABLE.iter().find(|(name, _)| *name == tag).map(|(_, met)| *met)
    })
    .unwrap_or(DEFAULT_MET)
}

/// ---------------------------------------------------------------------------
/// Per-Muscle Set Volume
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleVolume {
  pub muscle: String,
  pub sets: i64,
  /// Mean RPE across sets that recorded one (absent sets excluded entirely)
  pub avg_rpe: Option<f64>,
}

#[derive(Default)]
struct MuscleAccumulator {
  sets: i64,
  rpe_sum: f64,
  rpe_count: i64,
}

fn fold_muscles(entries: &[LogEntry], catalog: &ExerciseCatalog) -> HashMap<String, MuscleAccumulator> {
  let mut by_muscle: HashMap<String, MuscleAccumulator> = HashMap::new();

  for entry in entries {
    let Some(set) = entry.as_lifting() else { continue };

    // Fan-out: one set counts once per muscle group it targets
    for muscle in catalog.muscle_groups(&entry.exercise) {
      let acc = by_muscle.entry(muscle.clone()).or_default();
      acc.sets += 1;
      if let Some(rpe) = set.rpe {
        acc.rpe_sum += rpe;
        acc.rpe_count += 1;
      }
    }
  }

  by_muscle
}

/// Per-muscle set counts and average RPE, sorted by volume descending
pub fn muscle_volume(entries: &[LogEntry], catalog: &ExerciseCatalog) -> Vec<MuscleVolume> {
  let mut volumes: Vec<MuscleVolume> = fold_muscles(entries, catalog)
    .into_iter()
    .map(|(muscle, acc)| MuscleVolume {
      muscle,
      sets: acc.sets,
      avg_rpe: (acc.rpe_count > 0).then(|| acc.rpe_sum / acc.rpe_count as f64),
    })
    .collect();

  volumes.sort_by(|a, b| b.sets.cmp(&a.sets).then_with(|| a.muscle.cmp(&b.muscle)));
  volumes
}

/// ---------------------------------------------------------------------------
/// Muscle Distribution
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleShare {
  pub muscle: String,
  pub sets: i64,
  /// Share of all lifting sets, rounded to integer percent
  pub percent: i64,
}

/// Top-6 muscle share of total lifting sets; empty when no sets were logged
pub fn muscle_distribution(entries: &[LogEntry], catalog: &ExerciseCatalog) -> Vec<MuscleShare> {
  let total_sets = entries.iter().filter(|e| e.as_lifting().is_some()).count() as i64;
  if total_sets == 0 {
    return Vec::new();
  }

  let mut shares: Vec<MuscleShare> = fold_muscles(entries, catalog)
    .into_iter()
    .map(|(muscle, acc)| MuscleShare {
      muscle,
      sets: acc.sets,
      percent: (acc.sets as f64 / total_sets as f64 * 100.0).round() as i64,
    })
    .collect();

  shares.sort_by(|a, b| b.sets.cmp(&a.sets).then_with(|| a.muscle.cmp(&b.muscle)));
  shares.truncate(6);
  shares
}

/// ---------------------------------------------------------------------------
/// Cardio Load
/// ---------------------------------------------------------------------------

/// Load score for a single cardio entry:
/// `MET x effort/5 x (bodyweight + vest) x hours`, rounded to an integer
pub fn cardio_entry_load(cardio: &CardioEntry, modality: Option<&str>, bodyweight_kg: f64) -> i64 {
  let met = base_met(modality);
  let effort_factor = cardio.effort() / 5.0;
  let mass_kg = bodyweight_kg + cardio.vest_kg();
  let hours = cardio.duration_minutes() / 60.0;

  (met * effort_factor * mass_kg * hours).round() as i64
}

/// ---------------------------------------------------------------------------
/// Unified Training Load
/// ---------------------------------------------------------------------------

/// RPE assumed for a workout whose lifting sets carry none
const DEFAULT_LIFTING_RPE: f64 = 6.0;

const LIFTING_LOAD_FACTOR: f64 = 0.8;

/// Threshold below which total load reads as general fitness
const GENERAL_FITNESS_CEILING: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingProfile {
  GeneralFitness,
  StrengthFocused,
  CardioFocused,
  Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoad {
  pub lifting: i64,
  pub cardio: i64,
  pub total: i64,
  pub lifting_percent: i64,
  pub cardio_percent: i64,
  pub profile: TrainingProfile,
}

/// Blend lifting and cardio stress over a window of completed sessions.
///
/// Lifting load per workout is `duration_min x mean lifting RPE x 0.8`;
/// cardio load is summed per entry. Entries whose session is not in the
/// (completed) session list are ignored.
pub fn training_load(
  sessions: &[WorkoutSession],
  entries: &[LogEntry],
  catalog: &ExerciseCatalog,
  profile: &UserProfile,
) -> TrainingLoad {
  let completed: Vec<&WorkoutSession> = sessions.iter().filter(|s| s.is_completed()).collect();

  let mut entries_by_session: HashMap<i64, Vec<&LogEntry>> = HashMap::new();
  for entry in entries {
    entries_by_session.entry(entry.session_id).or_default().push(entry);
  }

  let bodyweight_kg = profile.bodyweight_kg();
  let mut lifting: i64 = 0;
  let mut cardio: i64 = 0;

  for session in &completed {
    let Some(session_entries) = entries_by_session.get(&session.id) else { continue };

    let lifting_sets: Vec<_> = session_entries.iter().filter_map(|e| e.as_lifting()).collect();
    if !lifting_sets.is_empty() {
      let rpes: Vec<f64> = lifting_sets.iter().filter_map(|s| s.rpe).collect();
      let mean_rpe = if rpes.is_empty() {
        DEFAULT_LIFTING_RPE
      } else {
        rpes.iter().sum::<f64>() / rpes.len() as f64
      };
      lifting += (session.duration_minutes() * mean_rpe * LIFTING_LOAD_FACTOR).round() as i64;
    }

    for entry in session_entries.iter() {
      if let Some(c) = entry.as_cardio() {
        cardio += cardio_entry_load(c, catalog.modality(&entry.exercise), bodyweight_kg);
      }
    }
  }

  let total = lifting + cardio;
  let (lifting_percent, cardio_percent) = if total > 0 {
    (
      (lifting as f64 / total as f64 * 100.0).round() as i64,
      (cardio as f64 / total as f64 * 100.0).round() as i64,
    )
  } else {
    (0, 0)
  };

  TrainingLoad {
    lifting,
    cardio,
    total,
    lifting_percent,
    cardio_percent,
    profile: classify_profile(total, lifting_percent, cardio_percent),
  }
}

/// Four-way classification, evaluated top-down
fn classify_profile(total: i64, lifting_percent: i64, cardio_percent: i64) -> TrainingProfile {
  if total < GENERAL_FITNESS_CEILING {
    TrainingProfile::GeneralFitness
  } else if lifting_percent >= 70 {
    TrainingProfile::StrengthFocused
  } else if cardio_percent >= 70 {
    TrainingProfile::CardioFocused
  } else {
    TrainingProfile::Hybrid
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
