//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Agenda must not be empty")]
    EmptyAgenda,

    #[error("Round {0} is already sealed")]
    RoundSealed(u32),

    #[error("Synthesis already recorded for meeting {0}")]
    SynthesisAlreadyRecorded(String),
}
