//! Error taxonomy for the command surface.
//!
//! Tick execution itself never fails — every per-tick system clamps
//! or no-ops on bad internal state rather than returning `Result`.
//! `SimError` covers only the command surface, where a caller can
//! hand the engine an invalid id or an out-of-order request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("capacity exceeded: {0}")]
    Capacity(String),
}

pub type SimResult<T> = Result<T, SimError>;
