//! Session store port
//!
//! Durable record of meetings: per-round participant output, chair
//! verdicts, the synthesis, and an append-only event log. The file
//! layout is an infrastructure detail; callers depend only on this
//! trait and the result surface.

use crate::ports::observer::MeetingEvent;
use conclave_domain::{ChairVerdict, Meeting, MeetingId, Round, Synthesis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Meeting not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(String),
}

/// One line in a meeting listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub meeting_id: String,
    pub agenda: String,
    pub created_at_ms: u64,
    pub total_rounds: u32,
    pub status: String,
}

/// Persistence port for meetings.
///
/// All writes happen on the orchestrator's task between awaits; the
/// operations are small appends, so the port is synchronous.
pub trait SessionStorePort: Send + Sync {
    /// Record a new meeting (metadata only; rounds follow).
    fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError>;

    /// Persist a completed round's question and outcomes.
    fn save_round(&self, id: &MeetingId, round: &Round) -> Result<(), StoreError>;

    /// Persist the verdict that sealed a round.
    fn save_verdict(&self, id: &MeetingId, verdict: &ChairVerdict) -> Result<(), StoreError>;

    /// Persist the final synthesis.
    fn save_synthesis(&self, id: &MeetingId, synthesis: &Synthesis) -> Result<(), StoreError>;

    /// Update terminal status ("completed" or "aborted") and elapsed time.
    fn mark_finished(
        &self,
        id: &MeetingId,
        status: &str,
        elapsed_ms: u64,
    ) -> Result<(), StoreError>;

    /// Append one structured event to the meeting's JSONL log.
    fn append_event(&self, id: &MeetingId, event: &MeetingEvent) -> Result<(), StoreError>;

    /// Load a persisted meeting with all rounds, for resume.
    fn load_meeting(&self, id: &MeetingId) -> Result<Meeting, StoreError>;

    /// List persisted meetings, newest first.
    fn list_meetings(&self) -> Result<Vec<MeetingSummary>, StoreError>;
}
