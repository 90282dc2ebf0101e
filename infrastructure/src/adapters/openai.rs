//! OpenAI chat-completions dialect.
//!
//! Tool calls arrive as `choices[0].message.tool_calls` with arguments
//! as a stringified JSON object; results go back as `role: "tool"`
//! messages keyed by `tool_call_id`.

use super::{parameters_schema, ToolCallAdapter};
use conclave_application::{GatewayError, ToolResultMessage};
use conclave_domain::{
    BackendKind, ContentBlock, LlmResponse, StopReason, ToolDefinition,
};
use serde_json::{json, Map, Value};

pub struct OpenAiAdapter;

impl ToolCallAdapter for OpenAiAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
    }

    fn render_tools(&self, tools: &[ToolDefinition]) -> Value {
        Value::Array(
            tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": parameters_schema(t),
                        }
                    })
                })
                .collect(),
        )
    }

    fn parse_response(&self, body: &Value) -> Result<LlmResponse, GatewayError> {
        let message = body
            .pointer("/choices/0/message")
            .ok_or_else(|| GatewayError::MalformedResponse("missing choices[0].message".into()))?;

        let mut content = Vec::new();
        if let Some(text) = message["content"].as_str() {
            if !text.is_empty() {
                content.push(ContentBlock::Text(text.to_string()));
            }
        }
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                content.push(parse_tool_call(call)?);
            }
        }

        let stop_reason = body
            .pointer("/choices/0/finish_reason")
            .and_then(Value::as_str)
            .map(|r| match r {
                "stop" => StopReason::EndTurn,
                "tool_calls" => StopReason::ToolUse,
                "length" => StopReason::MaxTokens,
                other => StopReason::Other(other.to_string()),
            });

        Ok(LlmResponse {
            content,
            stop_reason,
            model: body["model"].as_str().map(str::to_string),
        })
    }

    fn assistant_message(&self, response: &LlmResponse) -> Value {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in &response.content {
            match block {
                ContentBlock::Text(t) => text.push_str(t),
                ContentBlock::ToolUse { id, name, input } => {
                    let arguments =
                        serde_json::to_string(input).unwrap_or_else(|_| "{}".to_string());
                    tool_calls.push(json!({
                        "id": id,
                        "type": "function",
                        "function": { "name": name, "arguments": arguments },
                    }));
                }
                ContentBlock::UndecodableToolUse { id, name, .. } => {
                    tool_calls.push(json!({
                        "id": id,
                        "type": "function",
                        "function": { "name": name, "arguments": "{}" },
                    }));
                }
            }
        }
        let mut message = Map::new();
        message.insert("role".into(), json!("assistant"));
        message.insert(
            "content".into(),
            if text.is_empty() { Value::Null } else { json!(text) },
        );
        if !tool_calls.is_empty() {
            message.insert("tool_calls".into(), Value::Array(tool_calls));
        }
        Value::Object(message)
    }

    fn tool_result_messages(&self, results: &[ToolResultMessage]) -> Vec<Value> {
        results
            .iter()
            .map(|r| {
                json!({
                    "role": "tool",
                    "tool_call_id": r.tool_use_id,
                    "content": r.output,
                })
            })
            .collect()
    }
}

fn parse_tool_call(call: &Value) -> Result<ContentBlock, GatewayError> {
    let id = call["id"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedResponse("tool call without id".into()))?
        .to_string();
    let name = call
        .pointer("/function/name")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::MalformedResponse("tool call without function name".into()))?
        .to_string();
    let raw_arguments = call
        .pointer("/function/arguments")
        .and_then(Value::as_str)
        .unwrap_or("{}");

    // Arguments arrive as a JSON string; anything that does not decode
    // to an object becomes an undecodable block, id preserved.
    match serde_json::from_str::<Value>(raw_arguments) {
        Ok(Value::Object(map)) => Ok(ContentBlock::ToolUse {
            id,
            name,
            input: map.into_iter().collect(),
        }),
        Ok(other) => Ok(ContentBlock::UndecodableToolUse {
            id,
            name,
            reason: format!("expected argument object, got {}", json_type_name(&other)),
        }),
        Err(e) => Ok(ContentBlock::UndecodableToolUse {
            id,
            name,
            reason: format!("arguments were not valid JSON: {}", e),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_tool_calls() -> Value {
        json!({
            "model": "gpt-4.1",
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": "Let me check.",
                    "tool_calls": [
                        {
                            "id": "call_a",
                            "type": "function",
                            "function": {
                                "name": "find_files",
                                "arguments": "{\"pattern\": \"**/*.go\"}"
                            }
                        },
                        {
                            "id": "call_b",
                            "type": "function",
                            "function": {
                                "name": "read_file",
                                "arguments": "not json at all"
                            }
                        }
                    ]
                }
            }]
        })
    }

    #[test]
    fn parses_calls_in_order_with_ids() {
        let response = OpenAiAdapter.parse_response(&response_with_tool_calls()).unwrap();
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.text_content(), "Let me check.");

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].native_id.as_deref(), Some("call_a"));
        assert_eq!(calls[0].get_string("pattern"), Some("**/*.go"));
        assert_eq!(calls[1].native_id.as_deref(), Some("call_b"));
        assert!(calls[1].decode_error.is_some());
    }

    #[test]
    fn plain_text_response() {
        let body = json!({
            "choices": [{
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": "All done." }
            }]
        });
        let response = OpenAiAdapter.parse_response(&body).unwrap();
        assert!(!response.has_tool_calls());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn missing_message_is_malformed() {
        let err = OpenAiAdapter.parse_response(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn assistant_echo_round_trips_calls() {
        let response = OpenAiAdapter.parse_response(&response_with_tool_calls()).unwrap();
        let echo = OpenAiAdapter.assistant_message(&response);
        assert_eq!(echo["role"], "assistant");
        assert_eq!(echo["tool_calls"][0]["id"], "call_a");
        assert_eq!(
            echo["tool_calls"][0]["function"]["name"],
            "find_files"
        );
    }

    #[test]
    fn results_become_role_tool_messages() {
        let messages = OpenAiAdapter.tool_result_messages(&[ToolResultMessage {
            tool_use_id: "call_a".into(),
            tool_name: "find_files".into(),
            output: "src/main.rs".into(),
            is_error: false,
        }]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "tool");
        assert_eq!(messages[0]["tool_call_id"], "call_a");
    }

    #[test]
    fn rendered_tools_use_function_wrapper() {
        let tools = vec![ToolDefinition::new("find_files", "Locate files")];
        let rendered = OpenAiAdapter.render_tools(&tools);
        assert_eq!(rendered[0]["type"], "function");
        assert_eq!(rendered[0]["function"]["name"], "find_files");
    }
}
