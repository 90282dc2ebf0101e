//! Meeting observer port
//!
//! The orchestrator reports progress by calling an injected observer
//! synchronously at each lifecycle step. Whether the observer prints to
//! a console, feeds a dashboard, or no-ops is not the orchestrator's
//! concern; it never spawns side-effecting processes of its own.

use conclave_domain::{ChairDecision, ParticipantId};
use serde::Serialize;

/// One lifecycle event of a running meeting.
///
/// Serializable so a session store can append the same events to its
/// JSONL log that a console observer renders live.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MeetingEvent {
    MeetingStarted {
        meeting_id: String,
        agenda: String,
        max_rounds: u32,
    },
    RoundStarted {
        round: u32,
        max_rounds: u32,
        question: String,
    },
    ParticipantStarted {
        round: u32,
        participant: ParticipantId,
    },
    ToolInvoked {
        round: u32,
        participant: ParticipantId,
        tool: String,
        seq: u32,
    },
    ParticipantFinished {
        round: u32,
        participant: ParticipantId,
        success: bool,
        duration_ms: u64,
    },
    ChairDeciding {
        round: u32,
    },
    ChairVerdictReached {
        round: u32,
        decision: ChairDecision,
        #[serde(skip_serializing_if = "Option::is_none")]
        follow_up: Option<String>,
        format_error: bool,
    },
    SynthesisStarted {
        total_rounds: u32,
    },
    MeetingCompleted {
        meeting_id: String,
        total_rounds: u32,
        elapsed_ms: u64,
    },
    MeetingAborted {
        meeting_id: String,
        round: u32,
        failed: Vec<ParticipantId>,
    },
}

/// Synchronous observer of meeting progress.
pub trait MeetingObserver: Send + Sync {
    fn on_event(&self, event: &MeetingEvent);
}

/// Observer that ignores everything.
pub struct NoObserver;

impl MeetingObserver for NoObserver {
    fn on_event(&self, _event: &MeetingEvent) {}
}
