//! Meeting subdomain: the deliberation data model.
//!
//! A [`entities::Meeting`] accumulates sealed [`entities::Round`]s and
//! ends with exactly one [`entities::Synthesis`]. Participant results
//! are tagged [`outcome::ParticipantOutcome`]s; the chair's decision is
//! a parsed [`verdict::ChairVerdict`].

pub mod entities;
pub mod outcome;
pub mod verdict;
