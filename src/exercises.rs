//! Exercise catalog
//!
//! Log entries reference exercises by name, not by id, so every aggregate
//! resolves muscle groups and cardio modality through this normalized-name
//! lookup. Unknown exercises fall back to the `other` muscle group rather
//! than failing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Muscle group assigned when an exercise is not in the catalog
pub const DEFAULT_MUSCLE_GROUP: &str = "other";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
  pub name: String,
  pub muscle_groups: Vec<String>,
  /// Cardio modality tag, e.g. "running" or "cycling" (None for lifts)
  pub modality: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
  by_name: HashMap<String, ExerciseDefinition>,
  fallback_groups: Vec<String>,
}

fn normalize(name: &str) -> String {
  name.trim().to_lowercase()
}

impl ExerciseCatalog {
  pub fn new(definitions: Vec<ExerciseDefinition>) -> Self {
    let by_name = definitions
      .into_iter()
      .map(|def| (normalize(&def.name), def))
      .collect();

    Self {
      by_name,
      fallback_groups: vec![DEFAULT_MUSCLE_GROUP.to_string()],
    }
  }

  pub fn get(&self, name: &str) -> Option<&ExerciseDefinition> {
    self.by_name.get(&normalize(name))
  }

  /// Muscle groups for an exercise, falling back to `other` when unknown
  pub fn muscle_groups(&self, name: &str) -> &[String] {
    match self.get(name) {
      Some(def) if !def.muscle_groups.is_empty() => &def.muscle_groups,
      _ => &self.fallback_groups,
    }
  }

  /// Cardio modality tag for an exercise, if it has one
  pub fn modality(&self, name: &str) -> Option<&str> {
    self.get(name).and_then(|def| def.modality.as_deref())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
