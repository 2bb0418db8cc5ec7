//! Trend detection and personal records
//!
//! Classifies per-exercise load direction by comparing the first and second
//! halves of the weight history, and extracts top historical records.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{LogEntry, WorkoutSession};

/// ---------------------------------------------------------------------------
/// Trend Classification
/// ---------------------------------------------------------------------------

/// Percent change beyond which a trend reads as up or down
const TREND_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
  Up,
  Down,
  Flat,
}

/// Classify a dated weight series by midpoint split.
///
/// The series is sorted ascending by date, split at `floor(n/2)`, and the
/// half means compared. Fewer than 2 points is flat.
pub fn classify_weight_trend(points: &[(NaiveDate, f64)]) -> TrendDirection {
  if points.len() < 2 {
    return TrendDirection::Flat;
  }

  let mut sorted: Vec<&(NaiveDate, f64)> = points.iter().collect();
  sorted.sort_by_key(|(date, _)| *date);

  let mid = sorted.len() / 2;
  let first_avg =
    sorted[..mid].iter().map(|(_, w)| w).sum::<f64>() / mid as f64;
  let second_avg =
    sorted[mid..].iter().map(|(_, w)| w).sum::<f64>() / (sorted.len() - mid) as f64;

  let percent_change = if first_avg > 0.0 {
    (second_avg - first_avg) / first_avg * 100.0
  } else {
    0.0
  };

  if percent_change > TREND_THRESHOLD_PCT {
    TrendDirection::Up
  } else if percent_change < -TREND_THRESHOLD_PCT {
    TrendDirection::Down
  } else {
    TrendDirection::Flat
  }
}

/// ---------------------------------------------------------------------------
/// Per-Exercise Accumulation
/// ---------------------------------------------------------------------------

#[derive(Default)]
struct ExerciseAccumulator {
  sessions: HashSet<i64>,
  total_sets: i64,
  weighted_points: Vec<(NaiveDate, f64)>,
  top_weight_kg: Option<f64>,
  top_weight_date: Option<NaiveDate>,
  rpe_sum: f64,
  rpe_count: i64,
}

fn fold_exercises(
  sessions: &[WorkoutSession],
  entries: &[LogEntry],
) -> HashMap<String, ExerciseAccumulator> {
  let session_dates: HashMap<i64, NaiveDate> = sessions
    .iter()
    .filter(|s| s.is_completed())
    .map(|s| (s.id, s.started_at.date_naive()))
    .collect();

  let mut by_exercise: HashMap<String, ExerciseAccumulator> = HashMap::new();

  for entry in entries {
    let Some(set) = entry.as_lifting() else { continue };
    let Some(&date) = session_dates.get(&entry.session_id) else { continue };

    let acc = by_exercise.entry(entry.exercise.clone()).or_default();
    acc.sessions.insert(entry.session_id);
    acc.total_sets += 1;

    if let Some(rpe) = set.rpe {
      acc.rpe_sum += rpe;
      acc.rpe_count += 1;
    }

    if let Some(kg) = set.weight_kg() {
      acc.weighted_points.push((date, kg));
      if acc.top_weight_kg.is_none_or(|top| kg > top) {
        acc.top_weight_kg = Some(kg);
        acc.top_weight_date = Some(date);
      }
    }
  }

  by_exercise
}

/// ---------------------------------------------------------------------------
/// Personal Records
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
  pub exercise: String,
  pub top_weight_kg: f64,
  pub achieved_on: NaiveDate,
  /// Distinct sessions in which the exercise was performed
  pub sessions: i64,
}

/// Top historical records, ranked by how often the exercise is trained
/// (distinct session count), not by weight. Capped at 5.
pub fn personal_records(sessions: &[WorkoutSession], entries: &[LogEntry]) -> Vec<PersonalRecord> {
  let mut records: Vec<PersonalRecord> = fold_exercises(sessions, entries)
    .into_iter()
    .filter_map(|(exercise, acc)| {
      let top_weight_kg = acc.top_weight_kg?;
      let achieved_on = acc.top_weight_date?;
      Some(PersonalRecord {
        exercise,
        top_weight_kg,
        achieved_on,
        sessions: acc.sessions.len() as i64,
      })
    })
    .collect();

  records.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.exercise.cmp(&b.exercise)));
  records.truncate(5);
  records
}

/// ---------------------------------------------------------------------------
/// Exercise Trend Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTrend {
  pub exercise: String,
  pub sessions: i64,
  pub total_sets: i64,
  pub top_weight_kg: Option<f64>,
  pub avg_rpe: Option<f64>,
  pub trend: TrendDirection,
}

/// Report-facing summary per exercise. Only exercises seen in at least 2
/// sessions are retained, ordered by session count descending, capped at 10.
pub fn exercise_trends(sessions: &[WorkoutSession], entries: &[LogEntry]) -> Vec<ExerciseTrend> {
  let mut trends: Vec<ExerciseTrend> = fold_exercises(sessions, entries)
    .into_iter()
    .filter(|(_, acc)| acc.sessions.len() >= 2)
    .map(|(exercise, acc)| ExerciseTrend {
      exercise,
      sessions: acc.sessions.len() as i64,
      total_sets: acc.total_sets,
      top_weight_kg: acc.top_weight_kg,
      avg_rpe: (acc.rpe_count > 0).then(|| acc.rpe_sum / acc.rpe_count as f64),
      trend: classify_weight_trend(&acc.weighted_points),
    })
    .collect();

  trends.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.exercise.cmp(&b.exercise)));
  trends.truncate(10);
  trends
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
