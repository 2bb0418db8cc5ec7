//! Error types for decoding stored domain strings
//!
//! The analytics functions themselves are total; errors only arise when
//! turning persisted strings (units, statuses, swap reasons) back into enums.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
  #[error("Unknown weight unit: {0}")]
  UnknownWeightUnit(String),

  #[error("Unknown distance unit: {0}")]
  UnknownDistanceUnit(String),

  #[error("Unknown session status: {0}")]
  UnknownSessionStatus(String),

  #[error("Unknown swap reason: {0}")]
  UnknownSwapReason(String),
}
