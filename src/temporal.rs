//! Temporal bucketing
//!
//! Groups dated workouts into week and month buckets and computes streaks
//! over irregular training dates. Every function takes an explicit reference
//! timestamp so results are a pure function of the snapshot.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LogEntry, WorkoutSession};

/// ---------------------------------------------------------------------------
/// Week Keys
/// ---------------------------------------------------------------------------

/// Which day a week begins on.
///
/// The source product mixed both conventions across dashboards; here it is a
/// single explicit parameter. `Monday` is the crate default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
  Sunday,
  #[default]
  Monday,
}

/// The date of the week containing `ts`, under the given convention
pub fn week_key(ts: DateTime<Utc>, week_start: WeekStart) -> NaiveDate {
  let date = ts.date_naive();
  let offset = match week_start {
    WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    WeekStart::Monday => date.weekday().num_days_from_monday(),
  };
  date - Duration::days(i64::from(offset))
}

/// ---------------------------------------------------------------------------
/// Monthly Frequency
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFrequency {
  /// Calendar month key, `YYYY-MM`
  pub month: String,
  pub workouts: i64,
  pub total_sets: i64,
  pub avg_sets_per_workout: i64,
}

fn month_key(year: i32, month: u32) -> String {
  format!("{:04}-{:02}", year, month)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
  if month == 1 {
    (year - 1, 12)
  } else {
    (year, month - 1)
  }
}

/// Workout and set counts for the last 3 calendar months ending at
/// `reference`. Months without workouts are still emitted, so the result
/// always has exactly 3 entries in ascending key order.
pub fn monthly_frequency(
  sessions: &[WorkoutSession],
  entries: &[LogEntry],
  reference: DateTime<Utc>,
) -> Vec<MonthlyFrequency> {
  let ref_date = reference.date_naive();
  let mut months = vec![(ref_date.year(), ref_date.month())];
  for _ in 0..2 {
    let &(y, m) = months.last().expect("seeded above");
    months.push(previous_month(y, m));
  }
  months.reverse();

  // Pre-seed buckets so empty months still appear
  let mut workouts: HashMap<String, i64> = HashMap::new();
  let mut sets: HashMap<String, i64> = HashMap::new();
  for &(y, m) in &months {
    workouts.insert(month_key(y, m), 0);
    sets.insert(month_key(y, m), 0);
  }

  let mut session_month: HashMap<i64, String> = HashMap::new();
  for session in sessions.iter().filter(|s| s.is_completed()) {
    let date = session.started_at.date_naive();
    let key = month_key(date.year(), date.month());
    if let Some(count) = workouts.get_mut(&key) {
      *count += 1;
      session_month.insert(session.id, key);
    }
  }

  for entry in entries {
    if entry.as_lifting().is_none() {
      continue;
    }
    if let Some(key) = session_month.get(&entry.session_id) {
      *sets.get_mut(key).expect("bucket seeded") += 1;
    }
  }

  months
    .into_iter()
    .map(|(y, m)| {
      let key = month_key(y, m);
      let workouts = workouts[&key];
      let total_sets = sets[&key];
      MonthlyFrequency {
        month: key,
        workouts,
        total_sets,
        avg_sets_per_workout: if workouts > 0 {
          (total_sets as f64 / workouts as f64).round() as i64
        } else {
          0
        },
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Streaks
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
  pub current_streak: i64,
  pub longest_streak: i64,
  /// Completed workouts per observed week
  pub avg_per_week: f64,
}

/// Walk populated weeks from the earliest observed week to the reference
/// week. The current and immediately-prior week count as "still open": a gap
/// there does not break the current streak.
pub fn weekly_streaks(
  sessions: &[WorkoutSession],
  week_start: WeekStart,
  reference: DateTime<Utc>,
) -> StreakSummary {
  let completed: Vec<&WorkoutSession> = sessions.iter().filter(|s| s.is_completed()).collect();
  let weeks: BTreeSet<NaiveDate> = completed
    .iter()
    .map(|s| week_key(s.started_at, week_start))
    .collect();

  let (Some(&earliest), Some(&latest)) = (weeks.iter().next(), weeks.iter().next_back()) else {
    return StreakSummary {
      current_streak: 0,
      longest_streak: 0,
      avg_per_week: 0.0,
    };
  };

  let current_week = week_key(reference, week_start);

  // Longest run of consecutive populated weeks anywhere in the walk
  let mut longest: i64 = 0;
  let mut run: i64 = 0;
  let mut week = earliest;
  while week <= current_week.max(latest) {
    if weeks.contains(&week) {
      run += 1;
      longest = longest.max(run);
    } else {
      run = 0;
    }
    week += Duration::weeks(1);
  }

  // Current streak counts back from the latest populated week, but only if
  // that week is still open (the reference week or the one before it)
  let mut current: i64 = 0;
  if latest >= current_week - Duration::weeks(1) {
    let mut week = latest;
    while weeks.contains(&week) {
      current += 1;
      week -= Duration::weeks(1);
    }
  }

  let weeks_spanned = ((current_week.max(latest) - earliest).num_days() / 7 + 1).max(1);
  let avg_per_week = completed.len() as f64 / weeks_spanned as f64;

  StreakSummary {
    current_streak: current,
    longest_streak: longest,
    avg_per_week,
  }
}

/// ---------------------------------------------------------------------------
/// Consistency Rating
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyRating {
  Excellent,
  Good,
  Moderate,
  Developing,
}

/// Four-tier rating, evaluated top-down
pub fn consistency_rating(avg_per_week: f64, current_streak: i64) -> ConsistencyRating {
  if avg_per_week >= 4.0 && current_streak >= 4 {
    ConsistencyRating::Excellent
  } else if avg_per_week >= 3.0 && current_streak >= 2 {
    ConsistencyRating::Good
  } else if avg_per_week >= 2.0 {
    ConsistencyRating::Moderate
  } else {
    ConsistencyRating::Developing
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{EntryKind, LiftingSet, SessionStatus};
  use chrono::TimeZone;

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

  fn lifting_entry(id: i64, session_id: i64) -> LogEntry {
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
        weight_unit: None,
        rpe: None,
        warm_up: false,
        bodyweight: false,
      }),
    }
  }

  #[test]
  fn test_week_key_conventions() {
    // 2026-03-04 is a Wednesday
    let wednesday = Utc.with_ymd_and_hms(2026, 3, 4, 18, 30, 0).unwrap();

    let monday = week_key(wednesday, WeekStart::Monday);
    assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

    let sunday = week_key(wednesday, WeekStart::Sunday);
    assert_eq!(sunday, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
  }

  #[test]
  fn test_week_key_zeroes_time_of_day() {
    let late = Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 59).unwrap();
    let early = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 1).unwrap();
    assert_eq!(week_key(late, WeekStart::Monday), week_key(early, WeekStart::Monday));
  }

  #[test]
  fn test_monthly_frequency_preseeds_three_months() {
    let reference = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    // Two workouts in March, none earlier
    let sessions = vec![
      session_on(1, Utc.with_ymd_and_hms(2026, 3, 2, 18, 0, 0).unwrap()),
      session_on(2, Utc.with_ymd_and_hms(2026, 3, 9, 18, 0, 0).unwrap()),
    ];
    let entries = vec![
      lifting_entry(1, 1),
      lifting_entry(2, 1),
      lifting_entry(3, 1),
      lifting_entry(4, 2),
    ];

    let months = monthly_frequency(&sessions, &entries, reference);

    assert_eq!(months.len(), 3);
    assert_eq!(months[0].month, "2026-01");
    assert_eq!(months[1].month, "2026-02");
    assert_eq!(months[2].month, "2026-03");

    // Empty months still emitted with zeroed counts
    assert_eq!(months[0].workouts, 0);
    assert_eq!(months[0].avg_sets_per_workout, 0);

    assert_eq!(months[2].workouts, 2);
    assert_eq!(months[2].total_sets, 4);
    assert_eq!(months[2].avg_sets_per_workout, 2); // round(4 / 2)
  }

  #[test]
  fn test_monthly_frequency_crosses_year_boundary() {
    let reference = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
    let months = monthly_frequency(&[], &[], reference);
    assert_eq!(months[0].month, "2025-11");
    assert_eq!(months[1].month, "2025-12");
    assert_eq!(months[2].month, "2026-01");
  }

  #[test]
  fn test_streaks_consecutive_weeks() {
    // Workouts in the reference week and the 3 before it
    let reference = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
    let sessions: Vec<WorkoutSession> = (0..4)
      .map(|i| session_on(i, reference - Duration::weeks(i)))
      .collect();

    let summary = weekly_streaks(&sessions, WeekStart::Monday, reference);
    assert_eq!(summary.current_streak, 4);
    assert!(summary.longest_streak >= 4);
  }

  #[test]
  fn test_streak_survives_gap_in_open_week() {
    // No workout yet this week, but the 3 prior weeks are populated:
    // the open current week must not break the streak
    let reference = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
    let sessions: Vec<WorkoutSession> = (1..4)
      .map(|i| session_on(i, reference - Duration::weeks(i)))
      .collect();

    let summary = weekly_streaks(&sessions, WeekStart::Monday, reference);
    assert_eq!(summary.current_streak, 3);
  }

  #[test]
  fn test_streak_broken_by_two_empty_weeks() {
    // Latest workout is 2 full weeks back: streak has lapsed
    let reference = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
    let sessions = vec![
      session_on(1, reference - Duration::weeks(2)),
      session_on(2, reference - Duration::weeks(3)),
    ];

    let summary = weekly_streaks(&sessions, WeekStart::Monday, reference);
    assert_eq!(summary.current_streak, 0);
    assert_eq!(summary.longest_streak, 2);
  }

  #[test]
  fn test_longest_streak_with_mid_history_gap() {
    let reference = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
    // 5-week run, a 2-week gap, then a 2-week run ending now
    let mut sessions = Vec::new();
    for i in 4..9 {
      sessions.push(session_on(i, reference - Duration::weeks(i)));
    }
    sessions.push(session_on(1, reference - Duration::weeks(1)));
    sessions.push(session_on(0, reference));

    let summary = weekly_streaks(&sessions, WeekStart::Monday, reference);
    assert_eq!(summary.longest_streak, 5);
    assert_eq!(summary.current_streak, 2);
  }

  #[test]
  fn test_streaks_empty_history() {
    let reference = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
    let summary = weekly_streaks(&[], WeekStart::Monday, reference);
    assert_eq!(summary.current_streak, 0);
    assert_eq!(summary.longest_streak, 0);
    assert_eq!(summary.avg_per_week, 0.0);
  }

  #[test]
  fn test_consistency_tiers() {
    assert_eq!(consistency_rating(4.5, 5), ConsistencyRating::Excellent);
    // High average but short streak drops a tier
    assert_eq!(consistency_rating(4.5, 2), ConsistencyRating::Good);
    assert_eq!(consistency_rating(2.5, 0), ConsistencyRating::Moderate);
    assert_eq!(consistency_rating(1.0, 10), ConsistencyRating::Developing);
  }
}
