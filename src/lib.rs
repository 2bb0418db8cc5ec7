//! Deterministic training analytics over logged workout data.
//!
//! The crate takes an already-fetched snapshot of a user's sessions, log
//! entries, exercise catalog, swaps, and profile, and computes volume and
//! load aggregates, temporal consistency metrics, trend and record analysis,
//! and rule-based progression suggestions. Everything is a pure function of
//! its inputs: no clocks, no storage, no network. The [`report`] module
//! assembles the individual analyses into the JSON payloads consumed by the
//! app shell and the external summarizer.

pub mod error;
pub mod exercises;
pub mod models;
pub mod progression;
pub mod report;
pub mod temporal;
pub mod trends;
pub mod units;
pub mod volume;

pub use error::EngineError;
pub use exercises::{ExerciseCatalog, ExerciseDefinition};
pub use models::{
  CardioEntry, EntryKind, ExerciseSwap, LiftingSet, LogEntry, SessionStatus, SwapReason,
  UserProfile, WorkoutSession,
};
pub use progression::{recommend, recommend_with_fallback, AdjustmentType, ProgressionSuggestion};
pub use report::{FullReport, ReportInputs, ReportPeriod, SnapshotReport};
pub use temporal::WeekStart;
pub use trends::TrendDirection;
pub use volume::{TrainingLoad, TrainingProfile};
