//! Rule-Based Progression Recommender
//!
//! Produces a single next-session suggestion for one exercise from its 1-3
//! most recent completed sessions, each reduced to a best set. The decision
//! table is an explicitly ordered rule list evaluated first-match-wins, so
//! precedence is visible rather than implied by statement order.
//!
//! The recommender is a pure function of its inputs and doubles as the
//! deterministic fallback when an LLM-based recommendation path errors,
//! times out, or is rate-limited.

use serde::{Deserialize, Serialize};

use crate::models::{LiftingSet, LogEntry, WorkoutSession};
use crate::units::{round_to_step, to_kilograms, WeightUnit};

// ---------------------------------------------------------------------------
/// Session Snapshot: one past session reduced to its best set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLift {
    /// Weight in the user's display unit (echoed back in the suggestion)
    pub weight: f64,
    pub unit: WeightUnit,
    pub reps: i64,
    pub rpe: Option<f64>,
}

impl SessionLift {
    fn weight_kg(&self) -> f64 {
        to_kilograms(self.weight, self.unit)
    }
}

/// Reduce a session's sets to the best set: the working, non-warm-up set
/// with the highest weight. If no set has non-zero reps, fall back to the
/// first logged set.
pub fn best_set(sets: &[&LiftingSet]) -> Option<SessionLift> {
    let working = sets
        .iter()
        .filter(|s| !s.warm_up && s.reps.unwrap_or(0) > 0)
        .max_by(|a, b| {
            let a_kg = a.weight_kg().unwrap_or(0.0);
            let b_kg = b.weight_kg().unwrap_or(0.0);
            a_kg.partial_cmp(&b_kg).unwrap_or(std::cmp::Ordering::Equal)
        });

    let set = working.or_else(|| sets.first())?;

    Some(SessionLift {
        weight: set.weight.unwrap_or(0.0),
        unit: set.weight_unit.unwrap_or(WeightUnit::Kg),
        reps: set.reps.unwrap_or(0),
        rpe: set.rpe,
    })
}

/// Build the recommender input for one exercise: best sets of the up to 3
/// most recent completed sessions, most recent first.
pub fn recent_history(
    sessions: &[WorkoutSession],
    entries: &[LogEntry],
    exercise: &str,
) -> Vec<SessionLift> {
    let mut completed: Vec<&WorkoutSession> =
        sessions.iter().filter(|s| s.is_completed()).collect();
    completed.sort_by_key(|s| std::cmp::Reverse(s.started_at));

    let wanted = exercise.trim().to_lowercase();
    completed
        .iter()
        .filter_map(|session| {
            let sets: Vec<&LiftingSet> = entries
                .iter()
                .filter(|e| {
                    e.session_id == session.id && e.exercise.trim().to_lowercase() == wanted
                })
                .filter_map(|e| e.as_lifting())
                .collect();
            best_set(&sets)
        })
        .take(3)
        .collect()
}

// ---------------------------------------------------------------------------
/// Target Rep Range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub min: i64,
    pub max: i64,
}

impl RepRange {
    /// Parse a range out of a free-form string like `"8-12"` or `"5"`.
    /// The first one or two integers found define the range; a bare number
    /// yields min == max; no digits yields None (no range guidance).
    pub fn parse(raw: &str) -> Option<Self> {
        let mut numbers = Vec::new();
        let mut current = String::new();
        for ch in raw.chars() {
            if ch.is_ascii_digit() {
                current.push(ch);
            } else if !current.is_empty() {
                numbers.push(current.parse::<i64>().ok()?);
                current.clear();
                if numbers.len() == 2 {
                    break;
                }
            }
        }
        if !current.is_empty() && numbers.len() < 2 {
            numbers.push(current.parse::<i64>().ok()?);
        }

        match numbers.as_slice() {
            [single] => Some(Self { min: *single, max: *single }),
            [min, max, ..] => Some(Self { min: *min, max: *max }),
            [] => None,
        }
    }
}

// ---------------------------------------------------------------------------
/// Suggestion Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Deload,
    IncreaseWeight,
    IncreaseReps,
    Hold,
}

impl std::fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deload => write!(f, "deload"),
            Self::IncreaseWeight => write!(f, "increase_weight"),
            Self::IncreaseReps => write!(f, "increase_reps"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSuggestion {
    pub exercise: String,
    pub last_session: SessionLift,
    pub adjustment: AdjustmentType,
    /// Target weight in the last session's display unit
    pub target_weight: f64,
    pub target_reps: i64,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
/// Decision Table
// ---------------------------------------------------------------------------

struct RuleContext<'a> {
    history: &'a [SessionLift],
    range: Option<RepRange>,
}

struct Outcome {
    adjustment: AdjustmentType,
    target_weight: f64,
    target_reps: i64,
    reasoning: String,
}

impl RuleContext<'_> {
    fn latest(&self) -> &SessionLift {
        &self.history[0]
    }

    /// Prefix run of sessions at the most recent session's weight
    fn same_weight_run(&self) -> usize {
        let anchor = self.latest().weight_kg();
        self.history
            .iter()
            .take_while(|s| s.weight_kg() == anchor)
            .count()
    }

    /// As above, additionally requiring reps at or above the latest session's
    fn same_weight_and_reps_run(&self) -> usize {
        let anchor = self.latest().weight_kg();
        let reps = self.latest().reps;
        self.history
            .iter()
            .take_while(|s| s.weight_kg() == anchor && s.reps >= reps)
            .count()
    }

    /// Mean of RPEs present within the first `len` sessions; None if none
    fn run_mean_rpe(&self, len: usize) -> Option<f64> {
        let rpes: Vec<f64> = self.history[..len].iter().filter_map(|s| s.rpe).collect();
        if rpes.is_empty() {
            None
        } else {
            Some(rpes.iter().sum::<f64>() / rpes.len() as f64)
        }
    }

    fn no_rpe_recorded(&self) -> bool {
        self.history.iter().all(|s| s.rpe.is_none())
    }

    /// Reps to prescribe alongside a weight change: range minimum when a
    /// target range exists, otherwise carry the latest reps over
    fn reset_reps(&self) -> i64 {
        self.range.map_or(self.latest().reps, |r| r.min)
    }
}

type Rule = fn(&RuleContext) -> Option<Outcome>;

/// The ordered decision table. First match wins.
const RULES: &[Rule] = &[
    deload_after_repeated_max_effort,
    increase_weight_range_mastered,
    increase_weight_too_easy,
    increase_weight_no_rpe_data,
    hold_for_fatigue,
    increase_reps_toward_range,
    increase_reps_plateau,
    hold_default,
];

/// Two most recent rated sessions both at RPE 10: back off 10%
fn deload_after_repeated_max_effort(ctx: &RuleContext) -> Option<Outcome> {
    let rated: Vec<f64> = ctx.history.iter().filter_map(|s| s.rpe).collect();
    if rated.len() < 2 || rated[0] != 10.0 || rated[1] != 10.0 {
        return None;
    }

    let latest = ctx.latest();
    let target_weight = round_to_step(latest.weight * 0.9, latest.unit.deload_step());
    Some(Outcome {
        adjustment: AdjustmentType::Deload,
        target_weight,
        target_reps: ctx.reset_reps(),
        reasoning: format!(
            "Last two rated sessions were RPE 10; deloading to {} {} to recover",
            target_weight, latest.unit
        ),
    })
}

/// Top of the target range hit repeatedly at manageable effort: add weight
fn increase_weight_range_mastered(ctx: &RuleContext) -> Option<Outcome> {
    let range = ctx.range?;
    let run = ctx.same_weight_run();
    if run < 2 || !ctx.history[..run].iter().all(|s| s.reps >= range.max) {
        return None;
    }
    if ctx.run_mean_rpe(run).is_some_and(|mean| mean > 8.0) {
        return None;
    }

    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::IncreaseWeight,
        target_weight: latest.weight + latest.unit.increment(),
        target_reps: range.min,
        reasoning: format!(
            "Hit {} reps at {} {} for {} straight sessions; moving up and restarting the range",
            range.max, latest.weight, latest.unit, run
        ),
    })
}

/// Same weight repeated at low effort: add weight
fn increase_weight_too_easy(ctx: &RuleContext) -> Option<Outcome> {
    let run = ctx.same_weight_run();
    if run < 2 || !ctx.run_mean_rpe(run).is_some_and(|mean| mean <= 6.0) {
        return None;
    }

    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::IncreaseWeight,
        target_weight: latest.weight + latest.unit.increment(),
        target_reps: ctx.reset_reps(),
        reasoning: format!(
            "Mean RPE under 6 across {} sessions at {} {}; ready for more weight",
            run, latest.weight, latest.unit
        ),
    })
}

/// No RPE logged anywhere, but weight and reps matched twice: add weight
fn increase_weight_no_rpe_data(ctx: &RuleContext) -> Option<Outcome> {
    if !ctx.no_rpe_recorded() || ctx.same_weight_and_reps_run() < 2 {
        return None;
    }

    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::IncreaseWeight,
        target_weight: latest.weight + latest.unit.increment(),
        target_reps: ctx.reset_reps(),
        reasoning: format!(
            "No RPE logged, but {} {} x {} repeated across sessions; adding weight",
            latest.weight, latest.unit, latest.reps
        ),
    })
}

/// Recent near-maximal effort: hold and recover
fn hold_for_fatigue(ctx: &RuleContext) -> Option<Outcome> {
    let window = ctx.history.len().min(3);
    if !ctx.history[..window].iter().any(|s| s.rpe.is_some_and(|r| r >= 9.0)) {
        return None;
    }

    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::Hold,
        target_weight: latest.weight,
        target_reps: latest.reps,
        reasoning: "RPE 9+ in a recent session; holding weight and reps with a recovery focus"
            .to_string(),
    })
}

/// Below the range max: add a rep toward the top of the range
fn increase_reps_toward_range(ctx: &RuleContext) -> Option<Outcome> {
    let range = ctx.range?;
    let latest = ctx.latest();
    if latest.reps >= range.max {
        return None;
    }

    Some(Outcome {
        adjustment: AdjustmentType::IncreaseReps,
        target_weight: latest.weight,
        target_reps: (latest.reps + 1).min(range.max),
        reasoning: format!(
            "Working toward the top of the {}-{} range; adding a rep",
            range.min, range.max
        ),
    })
}

/// Stuck at the same weight with no range guidance: add a rep
fn increase_reps_plateau(ctx: &RuleContext) -> Option<Outcome> {
    if ctx.range.is_some() || ctx.same_weight_run() < 2 {
        return None;
    }

    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::IncreaseReps,
        target_weight: latest.weight,
        target_reps: latest.reps + 1,
        reasoning: format!(
            "{} sessions at {} {} with no target range; adding a rep to keep progressing",
            ctx.same_weight_run(),
            latest.weight,
            latest.unit
        ),
    })
}

/// Nothing matched: repeat the last session
fn hold_default(ctx: &RuleContext) -> Option<Outcome> {
    let latest = ctx.latest();
    Some(Outcome {
        adjustment: AdjustmentType::Hold,
        target_weight: latest.weight,
        target_reps: latest.reps,
        reasoning: "No clear progression signal; repeating last session".to_string(),
    })
}

// ---------------------------------------------------------------------------
/// Entry Points
// ---------------------------------------------------------------------------

/// Produce a suggestion from up to 3 recent best sets (most recent first)
/// and an optional target rep-range string. Returns None only when there is
/// no history to reason about.
pub fn recommend(
    exercise: &str,
    history: &[SessionLift],
    target_range: Option<&str>,
) -> Option<ProgressionSuggestion> {
    if history.is_empty() {
        return None;
    }

    let ctx = RuleContext {
        history,
        range: target_range.and_then(RepRange::parse),
    };

    let outcome = RULES
        .iter()
        .find_map(|rule| rule(&ctx))
        .expect("hold_default always matches");

    tracing::debug!(
        exercise,
        adjustment = %outcome.adjustment,
        "progression suggestion computed"
    );

    Some(ProgressionSuggestion {
        exercise: exercise.to_string(),
        last_session: history[0].clone(),
        adjustment: outcome.adjustment,
        target_weight: outcome.target_weight,
        target_reps: outcome.target_reps,
        reasoning: outcome.reasoning,
    })
}

/// Substitute the deterministic suggestion when an external (LLM-backed)
/// recommendation attempt fails. Callers see the same output shape either way.
pub fn recommend_with_fallback<E: std::fmt::Display>(
    exercise: &str,
    history: &[SessionLift],
    target_range: Option<&str>,
    external: Result<ProgressionSuggestion, E>,
) -> Option<ProgressionSuggestion> {
    match external {
        Ok(suggestion) => Some(suggestion),
        Err(err) => {
            tracing::debug!(exercise, error = %err, "external recommendation unavailable, using rule engine");
            recommend(exercise, history, target_range)
        }
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
