//! Participant outcome types.
//!
//! A participant's turn always settles into a [`ParticipantOutcome`],
//! success or failure, with the failure carried as structured data.
//! Control flow never inspects marker strings in the analysis text.

use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a participant's turn failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Backend transport error (network, auth, rate limit, bad payload)
    Transport,
    /// Externally imposed deadline expired
    Timeout,
    /// The tool-call loop hit its iteration ceiling
    MaxIterations,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::MaxIterations => "max_iterations",
        }
    }
}

/// Structured failure detail for one participant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantFailure {
    pub kind: FailureKind,
    /// Diagnostic detail (status class, not raw secrets)
    pub detail: String,
}

impl ParticipantFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ParticipantFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.detail)
    }
}

/// Audit record of one tool invocation within a participant's turn.
///
/// Sequence numbers are strictly increasing within one outcome; at most
/// one invocation is in flight per batch slot, so the record order is
/// the call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub seq: u32,
    pub tool_name: String,
    pub arguments: HashMap<String, serde_json::Value>,
    pub success: bool,
    /// Result payload on success, rendered error otherwise
    pub payload: String,
}

/// Terminal status of a participant's turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success { text: String },
    Failed { failure: ParticipantFailure },
}

/// The settled result of one participant for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    pub participant: ParticipantId,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub duration_ms: u64,
    #[serde(default)]
    pub invocations: Vec<InvocationRecord>,
}

impl ParticipantOutcome {
    pub fn success(
        participant: ParticipantId,
        text: impl Into<String>,
        duration_ms: u64,
        invocations: Vec<InvocationRecord>,
    ) -> Self {
        Self {
            participant,
            status: OutcomeStatus::Success { text: text.into() },
            duration_ms,
            invocations,
        }
    }

    pub fn failed(
        participant: ParticipantId,
        failure: ParticipantFailure,
        duration_ms: u64,
        invocations: Vec<InvocationRecord>,
    ) -> Self {
        Self {
            participant,
            status: OutcomeStatus::Failed { failure },
            duration_ms,
            invocations,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }

    /// The analysis text, if the turn succeeded.
    pub fn text(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Success { text } => Some(text),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&ParticipantFailure> {
        match &self.status {
            OutcomeStatus::Failed { failure } => Some(failure),
            OutcomeStatus::Success { .. } => None,
        }
    }
}
