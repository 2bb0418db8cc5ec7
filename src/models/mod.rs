pub mod profile;
pub mod workout;

pub use profile::{ExerciseSwap, ExperienceLevel, SwapReason, UserProfile, DEFAULT_BODYWEIGHT_KG};
pub use workout::{
  CardioEntry, EntryKind, LiftingSet, LogEntry, MobilityEntry, SessionStatus, SessionSummary,
  WorkoutSession, DEFAULT_SESSION_MINUTES,
};
