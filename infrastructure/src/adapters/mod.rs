//! Backend wire-dialect adapters.
//!
//! Each backend speaks its own tool-calling JSON; an adapter turns a
//! backend response body into the canonical [`LlmResponse`] and renders
//! canonical values back into that backend's message shapes. Call ids
//! and ordering are preserved exactly — backends correlate results to
//! calls by id, and a dropped or reordered id breaks the conversation.
//! Malformed argument payloads become `UndecodableToolUse` blocks, not
//! errors, so the conversation can continue with a structured tool
//! error.

pub mod anthropic;
pub mod openai;

use conclave_application::{GatewayError, ToolResultMessage};
use conclave_domain::{BackendKind, LlmResponse, ToolDefinition};
use serde_json::{json, Value};

pub trait ToolCallAdapter: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Render the tool vocabulary in this backend's schema.
    fn render_tools(&self, tools: &[ToolDefinition]) -> Value;

    /// Interpret a response body into canonical content blocks.
    fn parse_response(&self, body: &Value) -> Result<LlmResponse, GatewayError>;

    /// Reconstruct the assistant message to append to the transcript.
    fn assistant_message(&self, response: &LlmResponse) -> Value;

    /// Render one batch of tool results as transcript messages, in the
    /// given order.
    fn tool_result_messages(&self, results: &[ToolResultMessage]) -> Vec<Value>;
}

/// JSON-schema object for a tool's parameters, shared by both dialects.
pub(crate) fn parameters_schema(tool: &ToolDefinition) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in &tool.parameters {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.param_type,
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
