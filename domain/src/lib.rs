//! Domain layer for conclave
//!
//! Core types for multi-agent codebase deliberation: a meeting of
//! several model-backed participants, driven round by round by a chair
//! until consensus, with a read-only tool-calling vocabulary for
//! evidence gathering. No I/O lives here.

pub mod core;
pub mod meeting;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::{
    agenda::Agenda,
    error::DomainError,
    participant::{BackendKind, ParticipantId},
};
pub use meeting::{
    entities::{Meeting, MeetingId, Round, Synthesis},
    outcome::{FailureKind, InvocationRecord, OutcomeStatus, ParticipantFailure, ParticipantOutcome},
    verdict::{ChairDecision, ChairVerdict},
};
pub use session::response::{ContentBlock, LlmResponse, StopReason};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, DIFF_CHANGES, FIND_FILES, READ_FILE, SEARCH_CONTENT},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
