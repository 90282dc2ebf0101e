//! Tool domain entities
//!
//! Every tool in the evidence toolkit is read-only by contract, so there
//! is no risk classification here: a call either runs against the
//! confined repository root or is rejected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical tool names. Adapters translate whatever a backend emits
/// into these; the toolkit dispatches on them.
pub const FIND_FILES: &str = "find_files";
pub const SEARCH_CONTENT: &str = "search_content";
pub const READ_FILE: &str = "read_file";
pub const DIFF_CHANGES: &str = "diff_changes";

/// Definition of a tool offered to participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Canonical name (e.g. "find_files")
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// JSON schema type ("string", "integer", "boolean")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// One evidence request from a participant, mid-turn.
///
/// `native_id` is the backend-assigned call id; it must be echoed back
/// verbatim on the result or the backend cannot correlate the two.
/// `decode_error` is set by an adapter when the backend's argument
/// payload could not be decoded — such a call is answered with a
/// structured error result and never executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Canonical tool name
    pub tool_name: String,
    /// Decoded arguments
    pub arguments: HashMap<String, serde_json::Value>,
    /// Backend-assigned call id, preserved exactly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_id: Option<String>,
    /// Why argument decoding failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            native_id: None,
            decode_error: None,
        }
    }

    /// Build a call from a backend's native representation.
    pub fn from_native(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            tool_name: name.into(),
            arguments,
            native_id: Some(id.into()),
            decode_error: None,
        }
    }

    /// Build a call whose arguments could not be decoded.
    pub fn undecodable(
        id: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: name.into(),
            arguments: HashMap::new(),
            native_id: Some(id.into()),
            decode_error: Some(reason.into()),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional non-negative integer argument
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }
}
