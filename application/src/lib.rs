//! Application layer for conclave
//!
//! This crate contains use cases and port definitions for running
//! deliberation meetings. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage},
    observer::{MeetingEvent, MeetingObserver, NoObserver},
    session_store::{MeetingSummary, SessionStorePort, StoreError},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::chair::ChairEngine;
pub use use_cases::run_meeting::{
    MeetingOrchestrator, MeetingReport, RunMeetingError, RunMeetingInput,
};
pub use use_cases::run_participant::{ParticipantRunner, MAX_TOOL_ITERATIONS};
pub use use_cases::run_round::{RoundCoordinator, RoundError};
