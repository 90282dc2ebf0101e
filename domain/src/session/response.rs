//! Canonical model response types.
//!
//! Backends return responses as a sequence of content blocks mixing free
//! text and tool-use requests. Adapters normalize every dialect into
//! [`LlmResponse`]; the participant loop only ever looks at this shape.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One block of content within a model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text from the model.
    Text(String),

    /// A tool-use request. `id` is backend-assigned and must be echoed
    /// back on the matching result.
    ToolUse {
        id: String,
        name: String,
        input: HashMap<String, serde_json::Value>,
    },

    /// A tool-use request whose argument payload could not be decoded.
    /// Answered with a structured error result, never executed.
    UndecodableToolUse {
        id: String,
        name: String,
        reason: String,
    },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Why the model stopped generating.
///
/// `ToolUse` is the signal that drives the multi-turn loop: the caller
/// must execute the requested tools and send results back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of turn.
    EndTurn,
    /// The model wants tool results before continuing.
    ToolUse,
    /// Token limit hit; text may be cut off.
    MaxTokens,
    /// Backend-specific reason, passed through.
    Other(String),
}

/// A normalized model response: text and/or tool-use requests.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
    pub model: Option<String>,
}

impl LlmResponse {
    /// Wrap a plain text response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            stop_reason: Some(StopReason::EndTurn),
            model: None,
        }
    }

    /// Concatenate all text blocks.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract tool-use blocks as [`ToolCall`]s, in emission order.
    /// Undecodable blocks become calls carrying `decode_error`.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::from_native(id, name, input.clone()))
                }
                ContentBlock::UndecodableToolUse { id, name, reason } => {
                    Some(ToolCall::undecodable(id, name, reason))
                }
                ContentBlock::Text(_) => None,
            })
            .collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| !matches!(b, ContentBlock::Text(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_is_text_only() {
        let response = LlmResponse::from_text("No error handling found.");
        assert_eq!(response.text_content(), "No error handling found.");
        assert!(!response.has_tool_calls());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn tool_calls_keep_emission_order_and_ids() {
        let response = LlmResponse {
            content: vec![
                ContentBlock::Text("Checking two things.".to_string()),
                ContentBlock::ToolUse {
                    id: "call_a".to_string(),
                    name: "find_files".to_string(),
                    input: [("pattern".to_string(), serde_json::json!("**/*.go"))]
                        .into_iter()
                        .collect(),
                },
                ContentBlock::ToolUse {
                    id: "call_b".to_string(),
                    name: "search_content".to_string(),
                    input: [("query".to_string(), serde_json::json!("if err != nil"))]
                        .into_iter()
                        .collect(),
                },
            ],
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        };

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].native_id.as_deref(), Some("call_a"));
        assert_eq!(calls[1].native_id.as_deref(), Some("call_b"));
        assert_eq!(calls[1].tool_name, "search_content");
        assert_eq!(response.text_content(), "Checking two things.");
    }

    #[test]
    fn undecodable_block_becomes_error_call() {
        let response = LlmResponse {
            content: vec![ContentBlock::UndecodableToolUse {
                id: "call_x".to_string(),
                name: "read_file".to_string(),
                reason: "arguments were not valid JSON".to_string(),
            }],
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        };

        assert!(response.has_tool_calls());
        let calls = response.tool_calls();
        assert_eq!(calls[0].decode_error.as_deref(), Some("arguments were not valid JSON"));
    }
}
