//! Core domain concepts shared across all subdomains.
//!
//! - [`agenda::Agenda`] — the validated meeting topic
//! - [`participant::ParticipantId`] — one analyst's stable identity
//! - [`error::DomainError`] — domain-level errors

pub mod agenda;
pub mod error;
pub mod participant;
