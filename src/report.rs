//! Report assembly
//!
//! Composes the analytics modules into the two payload shapes handed to the
//! outside world: a light "snapshot" and a "full" report meant for the
//! external natural-language summarizer. All numeric fields are canonical
//! (kg, km, minutes); only the progression suggestion echoes display units.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::exercises::ExerciseCatalog;
use crate::models::{ExerciseSwap, LogEntry, SwapReason, UserProfile, WorkoutSession};
use crate::temporal::{
  consistency_rating, monthly_frequency, weekly_streaks, ConsistencyRating, MonthlyFrequency,
  WeekStart,
};
use crate::trends::{exercise_trends, personal_records, ExerciseTrend, PersonalRecord};
use crate::volume::{
  cardio_entry_load, muscle_distribution, muscle_volume, training_load, MuscleShare, MuscleVolume,
  TrainingLoad,
};

/// ---------------------------------------------------------------------------
/// Inputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportPeriod {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl ReportPeriod {
  fn contains(&self, ts: DateTime<Utc>) -> bool {
    ts >= self.start && ts <= self.end
  }
}

/// An already-fetched snapshot of one user's records.
///
/// Sessions and entries may span more history than the report period:
/// period-scoped aggregates (volume, cardio, load, trends, RPE series,
/// swaps) only see sessions started inside the period, while the historical
/// context (streaks, monthly frequency, records) uses everything supplied,
/// anchored at the period end.
#[derive(Debug, Clone)]
pub struct ReportInputs<'a> {
  pub sessions: &'a [WorkoutSession],
  pub entries: &'a [LogEntry],
  pub catalog: &'a ExerciseCatalog,
  pub swaps: &'a [ExerciseSwap],
  pub profile: &'a UserProfile,
  pub period: ReportPeriod,
  pub week_start: WeekStart,
}

impl ReportInputs<'_> {
  /// Completed sessions started inside the period, with their entries
  fn period_scope(&self) -> (Vec<WorkoutSession>, Vec<LogEntry>) {
    let sessions: Vec<WorkoutSession> = self
      .sessions
      .iter()
      .filter(|s| s.is_completed() && self.period.contains(s.started_at))
      .cloned()
      .collect();

    let ids: HashSet<i64> = sessions.iter().map(|s| s.id).collect();
    let entries: Vec<LogEntry> = self
      .entries
      .iter()
      .filter(|e| ids.contains(&e.session_id))
      .cloned()
      .collect();

    (sessions, entries)
  }
}

/// ---------------------------------------------------------------------------
/// Cardio Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioSummary {
  pub entries: i64,
  pub total_minutes: f64,
  pub total_km: f64,
  pub load: i64,
  /// Mean perceived effort across entries that recorded RPE or intensity
  pub avg_effort: Option<f64>,
}

fn cardio_summary(
  entries: &[LogEntry],
  catalog: &ExerciseCatalog,
  profile: &UserProfile,
) -> CardioSummary {
  let bodyweight_kg = profile.bodyweight_kg();
  let mut summary = CardioSummary {
    entries: 0,
    total_minutes: 0.0,
    total_km: 0.0,
    load: 0,
    avg_effort: None,
  };
  let mut effort_sum = 0.0;
  let mut effort_count = 0_i64;

  for entry in entries {
    let Some(cardio) = entry.as_cardio() else { continue };
    summary.entries += 1;
    summary.total_minutes += cardio.duration_minutes();
    summary.total_km += cardio.distance_km().unwrap_or(0.0);
    summary.load += cardio_entry_load(cardio, catalog.modality(&entry.exercise), bodyweight_kg);

    if let Some(effort) = cardio.rpe.or(cardio.intensity) {
      effort_sum += effort;
      effort_count += 1;
    }
  }

  summary.avg_effort = (effort_count > 0).then(|| effort_sum / effort_count as f64);
  summary
}

/// ---------------------------------------------------------------------------
/// RPE by Workout
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRpe {
  pub session_id: i64,
  pub date: NaiveDate,
  /// Mean RPE of the session's lifting sets; None when no set carried one
  pub avg_rpe: Option<f64>,
}

fn rpe_by_workout(sessions: &[WorkoutSession], entries: &[LogEntry]) -> Vec<WorkoutRpe> {
  let mut per_session: HashMap<i64, (f64, i64, bool)> = HashMap::new();
  for entry in entries {
    let Some(set) = entry.as_lifting() else { continue };
    let acc = per_session.entry(entry.session_id).or_insert((0.0, 0, false));
    acc.2 = true;
    if let Some(rpe) = set.rpe {
      acc.0 += rpe;
      acc.1 += 1;
    }
  }

  let mut series: Vec<WorkoutRpe> = sessions
    .iter()
    .filter_map(|session| {
      let &(sum, count, has_lifting) = per_session.get(&session.id)?;
      has_lifting.then(|| WorkoutRpe {
        session_id: session.id,
        date: session.started_at.date_naive(),
        avg_rpe: (count > 0).then(|| sum / count as f64),
      })
    })
    .collect();

  series.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.session_id.cmp(&b.session_id)));
  series
}

/// ---------------------------------------------------------------------------
/// Swap Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSummary {
  /// The exercise the user declined
  pub exercise: String,
  pub count: i64,
  pub top_reason: SwapReason,
}

fn swap_summary(swaps: &[ExerciseSwap], period: &ReportPeriod) -> Vec<SwapSummary> {
  let mut by_exercise: HashMap<String, HashMap<SwapReason, i64>> = HashMap::new();
  for swap in swaps.iter().filter(|s| period.contains(s.occurred_at)) {
    *by_exercise
      .entry(swap.from_exercise.clone())
      .or_default()
      .entry(swap.reason)
      .or_insert(0) += 1;
  }

  let mut summaries: Vec<SwapSummary> = by_exercise
    .into_iter()
    .map(|(exercise, reasons)| {
      let count = reasons.values().sum();
      let top_reason = reasons
        .into_iter()
        .max_by(|(ra, ca), (rb, cb)| ca.cmp(cb).then_with(|| rb.to_string().cmp(&ra.to_string())))
        .map(|(reason, _)| reason)
        .unwrap_or(SwapReason::Other);
      SwapSummary {
        exercise,
        count,
        top_reason,
      }
    })
    .collect();

  summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.exercise.cmp(&b.exercise)));
  summaries
}

/// ---------------------------------------------------------------------------
/// Historical Context
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalContext {
  pub muscle_distribution: Vec<MuscleShare>,
  pub monthly_frequency: Vec<MonthlyFrequency>,
  pub current_streak: i64,
  pub longest_streak: i64,
  pub avg_workouts_per_week: f64,
  /// The profile's target training days per week, for comparison against
  /// the observed average
  pub weekly_availability_target: Option<i64>,
  pub consistency: ConsistencyRating,
  pub personal_records: Vec<PersonalRecord>,
}

fn historical_context(inputs: &ReportInputs) -> HistoricalContext {
  let reference = inputs.period.end;
  let streaks = weekly_streaks(inputs.sessions, inputs.week_start, reference);

  // Distribution and records consider every supplied completed session
  let completed_ids: HashSet<i64> = inputs
    .sessions
    .iter()
    .filter(|s| s.is_completed())
    .map(|s| s.id)
    .collect();
  let completed_entries: Vec<LogEntry> = inputs
    .entries
    .iter()
    .filter(|e| completed_ids.contains(&e.session_id))
    .cloned()
    .collect();

  HistoricalContext {
    muscle_distribution: muscle_distribution(&completed_entries, inputs.catalog),
    monthly_frequency: monthly_frequency(inputs.sessions, inputs.entries, reference),
    current_streak: streaks.current_streak,
    longest_streak: streaks.longest_streak,
    avg_workouts_per_week: streaks.avg_per_week,
    weekly_availability_target: inputs.profile.weekly_availability,
    consistency: consistency_rating(streaks.avg_per_week, streaks.current_streak),
    personal_records: personal_records(inputs.sessions, inputs.entries),
  }
}

/// ---------------------------------------------------------------------------
/// Reports
/// ---------------------------------------------------------------------------

/// Light report: current-period volume and load only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
  pub period: ReportPeriod,
  pub muscle_volume: Vec<MuscleVolume>,
  pub cardio: CardioSummary,
  pub training_load: TrainingLoad,
}

impl SnapshotReport {
  pub fn build(inputs: &ReportInputs) -> Self {
    tracing::debug!(
      sessions = inputs.sessions.len(),
      entries = inputs.entries.len(),
      "building snapshot report"
    );

    let (sessions, entries) = inputs.period_scope();

    Self {
      period: inputs.period,
      muscle_volume: muscle_volume(&entries, inputs.catalog),
      cardio: cardio_summary(&entries, inputs.catalog, inputs.profile),
      training_load: training_load(&sessions, &entries, inputs.catalog, inputs.profile),
    }
  }

  /// Serialize for the external consumer
  pub fn to_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

/// Full report: the complete payload for the natural-language summarizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
  pub period: ReportPeriod,
  pub muscle_volume: Vec<MuscleVolume>,
  pub cardio: CardioSummary,
  pub training_load: TrainingLoad,
  pub exercise_trends: Vec<ExerciseTrend>,
  pub rpe_by_workout: Vec<WorkoutRpe>,
  pub swaps: Vec<SwapSummary>,
  pub historical: HistoricalContext,
}

impl FullReport {
  pub fn build(inputs: &ReportInputs) -> Self {
    tracing::debug!(
      sessions = inputs.sessions.len(),
      entries = inputs.entries.len(),
      "building full report"
    );

    let snapshot = SnapshotReport::build(inputs);
    let (sessions, entries) = inputs.period_scope();

    Self {
      period: inputs.period,
      muscle_volume: snapshot.muscle_volume,
      cardio: snapshot.cardio,
      training_load: snapshot.training_load,
      exercise_trends: exercise_trends(&sessions, &entries),
      rpe_by_workout: rpe_by_workout(&sessions, &entries),
      swaps: swap_summary(inputs.swaps, &inputs.period),
      historical: historical_context(inputs),
    }
  }

  /// Serialize for the external consumer
  pub fn to_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exercises::ExerciseDefinition;
  use crate::models::{CardioEntry, EntryKind, LiftingSet, SessionStatus};
  use crate::units::WeightUnit;
  use crate::volume::TrainingProfile;
  use chrono::{Duration, TimeZone};

  fn catalog() -> ExerciseCatalog {
    ExerciseCatalog::new(vec![
      ExerciseDefinition {
        name: "Squat".to_string(),
        muscle_groups: vec!["quads".to_string(), "glutes".to_string()],
        modality: None,
      },
      ExerciseDefinition {
        name: "Run".to_string(),
        muscle_groups: vec![],
        modality: Some("running".to_string()),
      },
    ])
  }

  fn session_on(id: i64, ts: DateTime<Utc>) -> WorkoutSession {
    WorkoutSession {
      id,
      user_id: 1,
      started_at: ts,
      completed_at: Some(ts + Duration::minutes(60)),
      status: SessionStatus::Completed,
      summary: None,
    }
  }

  fn squat_entry(id: i64, session_id: i64, rpe: Option<f64>) -> LogEntry {
    LogEntry {
      id,
      session_id,
      user_id: 1,
      exercise: "Squat".to_string(),
      logged_at: Utc::now(),
      entry: EntryKind::Lifting(LiftingSet {
        set_number: 1,
        reps: Some(5),
        weight: Some(100.0),
        weight_unit: Some(WeightUnit::Kg),
        rpe,
        warm_up: false,
        bodyweight: false,
      }),
    }
  }

  fn run_entry(id: i64, session_id: i64) -> LogEntry {
    LogEntry {
      id,
      session_id,
      user_id: 1,
      exercise: "Run".to_string(),
      logged_at: Utc::now(),
      entry: EntryKind::Cardio(CardioEntry {
        duration_seconds: 1800,
        distance: Some(5000.0),
        distance_unit: Some(crate::units::DistanceUnit::M),
        rpe: Some(7.0),
        intensity: None,
        added_weight: None,
        added_weight_unit: None,
      }),
    }
  }

  fn fixture() -> (
    Vec<WorkoutSession>,
    Vec<LogEntry>,
    ExerciseCatalog,
    Vec<ExerciseSwap>,
    UserProfile,
    ReportPeriod,
  ) {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();

    let sessions = vec![
      session_on(1, Utc.with_ymd_and_hms(2026, 3, 2, 18, 0, 0).unwrap()),
      session_on(2, Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap()),
      // Outside the period: historical only
      session_on(3, Utc.with_ymd_and_hms(2026, 2, 10, 18, 0, 0).unwrap()),
    ];
    let entries = vec![
      squat_entry(1, 1, Some(8.0)),
      squat_entry(2, 1, Some(7.0)),
      squat_entry(3, 2, None),
      run_entry(4, 2),
      squat_entry(5, 3, Some(8.0)),
    ];
    let swaps = vec![ExerciseSwap {
      id: 1,
      user_id: 1,
      occurred_at: Utc.with_ymd_and_hms(2026, 3, 9, 18, 5, 0).unwrap(),
      from_exercise: "Leg Press".to_string(),
      to_exercise: "Squat".to_string(),
      reason: SwapReason::EquipmentUnavailable,
    }];

    (
      sessions,
      entries,
      catalog(),
      swaps,
      UserProfile::default(),
      ReportPeriod { start, end },
    )
  }

  #[test]
  fn test_snapshot_report_scopes_to_period() {
    let (sessions, entries, catalog, swaps, profile, period) = fixture();
    let inputs = ReportInputs {
      sessions: &sessions,
      entries: &entries,
      catalog: &catalog,
      swaps: &swaps,
      profile: &profile,
      period,
      week_start: WeekStart::Monday,
    };

    let report = SnapshotReport::build(&inputs);

    // Only the two March sessions count: 3 squat sets, fan-out to 2 muscles
    let quads = report.muscle_volume.iter().find(|v| v.muscle == "quads").unwrap();
    assert_eq!(quads.sets, 3);
    assert_eq!(quads.avg_rpe, Some(7.5));

    assert_eq!(report.cardio.entries, 1);
    assert_eq!(report.cardio.total_minutes, 30.0);
    assert_eq!(report.cardio.total_km, 5.0);
    assert_eq!(report.cardio.load, 480);
    assert_eq!(report.cardio.avg_effort, Some(7.0));

    // Conservation: 360 + 288 lifting, 480 cardio
    let load = &report.training_load;
    assert_eq!(load.lifting, 648);
    assert_eq!(load.cardio, 480);
    assert_eq!(load.total, load.lifting + load.cardio);
    // 57% lifting / 43% cardio lands between the focused thresholds
    assert_eq!(load.profile, TrainingProfile::Hybrid);
  }

  #[test]
  fn test_full_report_composition() {
    let (sessions, entries, catalog, swaps, profile, period) = fixture();
    let profile = UserProfile {
      weekly_availability: Some(4),
      ..profile
    };
    let inputs = ReportInputs {
      sessions: &sessions,
      entries: &entries,
      catalog: &catalog,
      swaps: &swaps,
      profile: &profile,
      period,
      week_start: WeekStart::Monday,
    };

    let report = FullReport::build(&inputs);

    // Squat seen in both period sessions
    assert_eq!(report.exercise_trends.len(), 1);
    assert_eq!(report.exercise_trends[0].exercise, "Squat");

    // RPE series: session 1 averages, session 2 has sets but no RPE
    assert_eq!(report.rpe_by_workout.len(), 2);
    assert_eq!(report.rpe_by_workout[0].avg_rpe, Some(7.5));
    assert_eq!(report.rpe_by_workout[1].avg_rpe, None);

    assert_eq!(report.swaps.len(), 1);
    assert_eq!(report.swaps[0].exercise, "Leg Press");
    assert_eq!(report.swaps[0].count, 1);
    assert_eq!(report.swaps[0].top_reason, SwapReason::EquipmentUnavailable);

    // Historical context sees the February session too
    assert_eq!(report.historical.monthly_frequency.len(), 3);
    let feb = &report.historical.monthly_frequency[1];
    assert_eq!(feb.month, "2026-02");
    assert_eq!(feb.workouts, 1);
    assert!(!report.historical.muscle_distribution.is_empty());
    assert_eq!(report.historical.personal_records[0].exercise, "Squat");

    // The profile's availability target rides along with the observed average
    assert_eq!(report.historical.weekly_availability_target, Some(4));
  }

  #[test]
  fn test_report_idempotence() {
    // Same snapshot in, byte-identical payload out
    let (sessions, entries, catalog, swaps, profile, period) = fixture();
    let inputs = ReportInputs {
      sessions: &sessions,
      entries: &entries,
      catalog: &catalog,
      swaps: &swaps,
      profile: &profile,
      period,
      week_start: WeekStart::Monday,
    };

    let first = FullReport::build(&inputs);
    let second = FullReport::build(&inputs);
    assert_eq!(first, second);
    assert_eq!(first.to_json(), second.to_json());
  }

  #[test]
  fn test_empty_snapshot_builds_cleanly() {
    let catalog = ExerciseCatalog::default();
    let profile = UserProfile::default();
    let period = ReportPeriod {
      start: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
      end: Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap(),
    };
    let inputs = ReportInputs {
      sessions: &[],
      entries: &[],
      catalog: &catalog,
      swaps: &[],
      profile: &profile,
      period,
      week_start: WeekStart::Monday,
    };

    let report = FullReport::build(&inputs);
    assert!(report.muscle_volume.is_empty());
    assert_eq!(report.training_load.total, 0);
    assert_eq!(report.training_load.lifting_percent, 0);
    assert!(report.historical.muscle_distribution.is_empty());
    assert_eq!(report.historical.consistency, ConsistencyRating::Developing);
    assert_eq!(report.historical.weekly_availability_target, None);
    // Months are still pre-seeded
    assert_eq!(report.historical.monthly_frequency.len(), 3);
  }
}
