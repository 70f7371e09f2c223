//! Error types for `cadence-core` — the domain failure vocabulary.
//!
//! Transport layers translate these (not-found, invalid-argument,
//! conflict) into their own status codes; backend errors stay separate in
//! each store implementation.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lead not found: {0}")]
  LeadNotFound(Uuid),

  #[error("pool number not found: {0}")]
  NumberNotFound(Uuid),

  #[error("unknown outcome: {0:?}")]
  UnknownOutcome(String),

  #[error("unknown region: {0:?}")]
  UnknownRegion(String),

  #[error("phone number already in the pool: {0}")]
  DuplicateNumber(String),
}
