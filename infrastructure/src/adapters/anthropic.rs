//! Anthropic messages dialect.
//!
//! Tool calls arrive as `tool_use` content blocks; results go back as
//! one user message holding `tool_result` blocks tagged with the call
//! ids, in the original call order.

use super::{parameters_schema, ToolCallAdapter};
use conclave_application::{GatewayError, ToolResultMessage};
use conclave_domain::{
    BackendKind, ContentBlock, LlmResponse, StopReason, ToolDefinition,
};
use serde_json::{json, Value};

pub struct AnthropicAdapter;

impl ToolCallAdapter for AnthropicAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Anthropic
    }

    fn render_tools(&self, tools: &[ToolDefinition]) -> Value {
        Value::Array(
            tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": parameters_schema(t),
                    })
                })
                .collect(),
        )
    }

    fn parse_response(&self, body: &Value) -> Result<LlmResponse, GatewayError> {
        let blocks = body["content"]
            .as_array()
            .ok_or_else(|| GatewayError::MalformedResponse("missing content array".into()))?;

        let mut content = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str() {
                        content.push(ContentBlock::Text(text.to_string()));
                    }
                }
                Some("tool_use") => content.push(parse_tool_use(block)?),
                // thinking blocks and future types are passed over
                _ => {}
            }
        }

        let stop_reason = body["stop_reason"].as_str().map(|r| match r {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            other => StopReason::Other(other.to_string()),
        });

        Ok(LlmResponse {
            content,
            stop_reason,
            model: body["model"].as_str().map(str::to_string),
        })
    }

    fn assistant_message(&self, response: &LlmResponse) -> Value {
        let blocks: Vec<Value> = response
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text(t) => json!({ "type": "text", "text": t }),
                ContentBlock::ToolUse { id, name, input } => json!({
                    "type": "tool_use",
                    "id": id,
                    "name": name,
                    "input": input,
                }),
                ContentBlock::UndecodableToolUse { id, name, .. } => json!({
                    "type": "tool_use",
                    "id": id,
                    "name": name,
                    "input": {},
                }),
            })
            .collect();
        json!({ "role": "assistant", "content": blocks })
    }

    fn tool_result_messages(&self, results: &[ToolResultMessage]) -> Vec<Value> {
        // All results for one batch travel in a single user message.
        let blocks: Vec<Value> = results
            .iter()
            .map(|r| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": r.tool_use_id,
                    "content": r.output,
                    "is_error": r.is_error,
                })
            })
            .collect();
        vec![json!({ "role": "user", "content": blocks })]
    }
}

fn parse_tool_use(block: &Value) -> Result<ContentBlock, GatewayError> {
    let id = block["id"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedResponse("tool_use block without id".into()))?
        .to_string();
    let name = block["name"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedResponse("tool_use block without name".into()))?
        .to_string();

    match &block["input"] {
        Value::Object(map) => Ok(ContentBlock::ToolUse {
            id,
            name,
            input: map.clone().into_iter().collect(),
        }),
        other => Ok(ContentBlock::UndecodableToolUse {
            id,
            name,
            reason: format!("tool_use input was not an object: {}", other),
        }),
    }
}
