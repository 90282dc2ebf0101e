//! LLM gateway port
//!
//! How the application layer talks to model backends. Implementations
//! live in the infrastructure layer; the orchestrator only ever sees
//! canonical [`LlmResponse`] values, whatever the wire dialect.

use async_trait::async_trait;
use conclave_domain::{LlmResponse, ParticipantId, ToolDefinition};
use thiserror::Error;

/// Errors from a model backend.
///
/// Diagnostic strings carry a status class ("HTTP 429"), never request
/// bodies or credentials.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend response could not be interpreted: {0}")]
    MalformedResponse(String),

    #[error("No backend configured for participant: {0}")]
    UnknownParticipant(String),

    #[error("Backend timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// One tool result heading back to a backend, tagged with the call id
/// the backend assigned. Dropping or reordering ids breaks the
/// conversation; renderers must preserve both exactly.
#[derive(Debug, Clone)]
pub struct ToolResultMessage {
    pub tool_use_id: String,
    pub tool_name: String,
    pub output: String,
    pub is_error: bool,
}

/// Gateway for creating per-turn backend sessions.
///
/// A session is one conversation: created fresh for each participant
/// turn (or chair invocation) and dropped afterwards.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Session for a participant's tool-calling turn.
    async fn create_participant_session(
        &self,
        participant: &ParticipantId,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;

    /// Session for the chair. Tool access is structurally absent: the
    /// chair session only supports free-text exchange.
    async fn create_chair_session(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active backend conversation.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Backend description for logs ("openai/gpt-4.1", ...).
    fn backend(&self) -> &str;

    /// Send free text, get free text.
    async fn send(&self, content: &str) -> Result<String, GatewayError>;

    /// Send text with the tool vocabulary offered; the response may
    /// request tool calls.
    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError>;

    /// Return one batch of tool results, in original call order, and
    /// get the model's next response.
    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError>;
}
