//! HTTP gateway for OpenAI- and Anthropic-dialect backends.
//!
//! One [`HttpLlmSession`] is one conversation: it accumulates the
//! message transcript locally and replays it on every request, with the
//! wire shapes delegated to the backend's [`ToolCallAdapter`]. API keys
//! are read from the environment at session creation and never logged.

use crate::adapters::{anthropic::AnthropicAdapter, openai::OpenAiAdapter, ToolCallAdapter};
use crate::config::BackendConfig;
use async_trait::async_trait;
use conclave_application::{GatewayError, LlmGateway, LlmSession, ToolResultMessage};
use conclave_domain::{BackendKind, LlmResponse, ParticipantId, ToolDefinition};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 4096;

pub struct HttpLlmGateway {
    client: reqwest::Client,
    participants: HashMap<String, BackendConfig>,
    chair: BackendConfig,
}

impl HttpLlmGateway {
    pub fn new(
        participants: Vec<BackendConfig>,
        chair: BackendConfig,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            participants: participants
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            chair,
        })
    }

    fn open_session(
        &self,
        config: &BackendConfig,
        system_prompt: &str,
    ) -> Result<HttpLlmSession, GatewayError> {
        let kind: BackendKind = config
            .backend_kind()
            .map_err(GatewayError::Other)?;
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::Connection(format!(
                "API key environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        let adapter: Arc<dyn ToolCallAdapter> = match kind {
            BackendKind::OpenAi => Arc::new(OpenAiAdapter),
            BackendKind::Anthropic => Arc::new(AnthropicAdapter),
        };

        let mut messages = Vec::new();
        // OpenAI carries the system prompt in the transcript; Anthropic
        // takes it as a top-level request field.
        if kind == BackendKind::OpenAi {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }

        Ok(HttpLlmSession {
            client: self.client.clone(),
            adapter,
            kind,
            label: format!("{}/{}", kind, config.model),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            system_prompt: system_prompt.to_string(),
            transcript: Mutex::new(messages),
            offered_tools: Mutex::new(None),
        })
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn create_participant_session(
        &self,
        participant: &ParticipantId,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        let config = self
            .participants
            .get(participant.as_str())
            .ok_or_else(|| GatewayError::UnknownParticipant(participant.to_string()))?;
        Ok(Box::new(self.open_session(config, system_prompt)?))
    }

    async fn create_chair_session(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(self.open_session(&self.chair, system_prompt)?))
    }
}

pub struct HttpLlmSession {
    client: reqwest::Client,
    adapter: Arc<dyn ToolCallAdapter>,
    kind: BackendKind,
    label: String,
    base_url: String,
    model: String,
    api_key: String,
    system_prompt: String,
    /// Full message transcript in the backend's native shapes.
    transcript: Mutex<Vec<Value>>,
    /// Tool vocabulary from the last `send_with_tools`, re-offered on
    /// every follow-up request of the turn.
    offered_tools: Mutex<Option<Value>>,
}

impl HttpLlmSession {
    fn endpoint(&self) -> String {
        match self.kind {
            BackendKind::OpenAi => format!("{}/chat/completions", self.base_url),
            BackendKind::Anthropic => format!("{}/messages", self.base_url),
        }
    }

    fn request_body(&self, messages: &[Value], tools: Option<&Value>) -> Value {
        let mut body = match self.kind {
            BackendKind::OpenAi => json!({
                "model": self.model,
                "messages": messages,
            }),
            BackendKind::Anthropic => json!({
                "model": self.model,
                "max_tokens": ANTHROPIC_MAX_TOKENS,
                "system": self.system_prompt,
                "messages": messages,
            }),
        };
        if let Some(tools) = tools {
            body["tools"] = tools.clone();
        }
        body
    }

    async fn round_trip(&self, with_tools: bool) -> Result<LlmResponse, GatewayError> {
        let messages = {
            let transcript = self.lock_transcript()?;
            transcript.clone()
        };
        let tools = if with_tools {
            self.lock_tools()?.clone()
        } else {
            None
        };
        let body = self.request_body(&messages, tools.as_ref());

        debug!(backend = %self.label, messages = messages.len(), "backend request");
        let request = match self.kind {
            BackendKind::OpenAi => self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key),
            BackendKind::Anthropic => self
                .client
                .post(self.endpoint())
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = request.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Connection(format!("request to {} failed: {e}", self.label))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            // Status class only; response bodies may echo request content.
            return Err(GatewayError::RequestFailed(format!(
                "{} returned HTTP {}",
                self.label,
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON body: {e}")))?;
        let parsed = self.adapter.parse_response(&payload)?;

        let mut transcript = self.lock_transcript()?;
        transcript.push(self.adapter.assistant_message(&parsed));
        Ok(parsed)
    }

    fn lock_transcript(&self) -> Result<std::sync::MutexGuard<'_, Vec<Value>>, GatewayError> {
        self.transcript
            .lock()
            .map_err(|_| GatewayError::Other("session transcript poisoned".into()))
    }

    fn lock_tools(&self) -> Result<std::sync::MutexGuard<'_, Option<Value>>, GatewayError> {
        self.offered_tools
            .lock()
            .map_err(|_| GatewayError::Other("session tool state poisoned".into()))
    }
}

#[async_trait]
impl LlmSession for HttpLlmSession {
    fn backend(&self) -> &str {
        &self.label
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.lock_transcript()?
            .push(json!({ "role": "user", "content": content }));
        let response = self.round_trip(false).await?;
        Ok(response.text_content())
    }

    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError> {
        *self.lock_tools()? = Some(self.adapter.render_tools(tools));
        self.lock_transcript()?
            .push(json!({ "role": "user", "content": content }));
        self.round_trip(true).await
    }

    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError> {
        {
            let mut transcript = self.lock_transcript()?;
            for message in self.adapter.tool_result_messages(results) {
                transcript.push(message);
            }
        }
        self.round_trip(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(id: &str, backend: &str, key_env: &str) -> BackendConfig {
        BackendConfig {
            id: id.to_string(),
            backend: backend.to_string(),
            model: "test-model".to_string(),
            base_url: "https://api.example.test/v1/".to_string(),
            api_key_env: key_env.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_participant_is_rejected() {
        let gateway =
            HttpLlmGateway::new(vec![], backend("chair", "openai", "PATH")).unwrap();
        let result = gateway
            .create_participant_session(&ParticipantId::new("nope"), "system")
            .await;
        assert!(matches!(result, Err(GatewayError::UnknownParticipant(_))));
    }

    #[tokio::test]
    async fn missing_api_key_is_a_connection_error() {
        let gateway = HttpLlmGateway::new(
            vec![backend("gpt", "openai", "CONCLAVE_TEST_NO_SUCH_KEY")],
            backend("chair", "openai", "PATH"),
        )
        .unwrap();
        let result = gateway
            .create_participant_session(&ParticipantId::new("gpt"), "system")
            .await;
        assert!(matches!(result, Err(GatewayError::Connection(_))));
    }

    #[test]
    fn endpoints_follow_the_dialect() {
        let gateway = HttpLlmGateway::new(vec![], backend("chair", "anthropic", "PATH")).unwrap();
        let session = gateway.open_session(&gateway.chair, "system").unwrap();
        assert_eq!(session.endpoint(), "https://api.example.test/v1/messages");
        assert_eq!(session.backend(), "anthropic/test-model");
    }

    #[test]
    fn anthropic_body_carries_system_field() {
        let gateway = HttpLlmGateway::new(vec![], backend("chair", "anthropic", "PATH")).unwrap();
        let session = gateway.open_session(&gateway.chair, "be brief").unwrap();
        let body = session.request_body(&[json!({"role": "user", "content": "q"})], None);
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["max_tokens"], ANTHROPIC_MAX_TOKENS);
        assert!(body.get("tools").is_none());
    }
}
