//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chair;
pub mod prompts;
pub mod run_meeting;
pub mod run_participant;
pub mod run_round;

#[cfg(test)]
pub(crate) mod testing;
