//! Scripted fakes shared by the use-case tests.
//!
//! Sessions replay queued [`LlmResponse`]s keyed by participant id (the
//! chair uses the `"chair"` key) and record every tool-result batch they
//! receive, so tests can assert on both sides of the conversation.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage};
use crate::ports::observer::MeetingEvent;
use crate::ports::session_store::{MeetingSummary, SessionStorePort, StoreError};
use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use conclave_domain::{
    ChairVerdict, LlmResponse, Meeting, MeetingId, ParticipantId, Round, Synthesis, ToolCall,
    ToolDefinition, ToolParameter, ToolResult,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const CHAIR_KEY: &str = "chair";

type Script = Arc<Mutex<VecDeque<LlmResponse>>>;
type ResultLog = Arc<Mutex<Vec<Vec<ToolResultMessage>>>>;

#[derive(Default)]
pub(crate) struct MockGateway {
    scripts: Mutex<HashMap<String, Script>>,
    result_logs: Mutex<HashMap<String, ResultLog>>,
    failing: Mutex<HashSet<String>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue replies for one session key (participant id or "chair").
    pub(crate) fn script(&self, key: &str, replies: Vec<LlmResponse>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Mutex::new(replies.into())));
    }

    /// Make every send on this key fail with a transport error.
    pub(crate) fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    /// All tool-result batches this key's sessions received, in order.
    pub(crate) fn result_batches(&self, key: &str) -> Vec<Vec<ToolResultMessage>> {
        self.result_logs
            .lock()
            .unwrap()
            .get(key)
            .map(|log| log.lock().unwrap().clone())
            .unwrap_or_default()
    }

    fn open(&self, key: &str) -> MockSession {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default();
        let results = self
            .result_logs
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .clone();
        MockSession {
            key: key.to_string(),
            script,
            results,
            failing: self.failing.lock().unwrap().contains(key),
        }
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn create_participant_session(
        &self,
        participant: &ParticipantId,
        _system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(self.open(participant.as_str())))
    }

    async fn create_chair_session(
        &self,
        _system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(self.open(CHAIR_KEY)))
    }
}

struct MockSession {
    key: String,
    script: Script,
    results: ResultLog,
    failing: bool,
}

impl MockSession {
    fn next_reply(&self) -> Result<LlmResponse, GatewayError> {
        if self.failing {
            return Err(GatewayError::RequestFailed("HTTP 500".to_string()));
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::Other(format!("no scripted reply for {}", self.key)))
    }
}

#[async_trait]
impl LlmSession for MockSession {
    fn backend(&self) -> &str {
        "mock"
    }

    async fn send(&self, _content: &str) -> Result<String, GatewayError> {
        self.next_reply().map(|r| r.text_content())
    }

    async fn send_with_tools(
        &self,
        _content: &str,
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError> {
        self.next_reply()
    }

    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError> {
        self.results.lock().unwrap().push(results.to_vec());
        self.next_reply()
    }
}

/// Tool executor that echoes its arguments back, optionally after a
/// per-tool delay (for paused-clock ordering tests).
pub(crate) struct MockToolExecutor {
    definitions: Vec<ToolDefinition>,
    delays: Mutex<HashMap<String, Duration>>,
    completion_order: Mutex<Vec<String>>,
}

impl MockToolExecutor {
    pub(crate) fn new() -> Self {
        Self {
            definitions: vec![
                ToolDefinition::new("find_files", "Locate files by glob pattern")
                    .with_parameter(ToolParameter::new("pattern", "Glob pattern", true)),
                ToolDefinition::new("read_file", "Read a file snippet")
                    .with_parameter(ToolParameter::new("path", "Relative path", true)),
            ],
            delays: Mutex::new(HashMap::new()),
            completion_order: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn delay(&self, tool_name: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(tool_name.to_string(), delay);
    }

    /// Tool names in the order their executions finished.
    pub(crate) fn completion_order(&self) -> Vec<String> {
        self.completion_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutorPort for MockToolExecutor {
    fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let delay = self.delays.lock().unwrap().get(&call.tool_name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.completion_order
            .lock()
            .unwrap()
            .push(call.tool_name.clone());
        let args = serde_json::to_string(&call.arguments).unwrap_or_default();
        ToolResult::success(&call.tool_name, format!("{}({})", call.tool_name, args))
    }
}

/// In-memory session store recording what the orchestrator persists.
#[derive(Default)]
pub(crate) struct MockStore {
    meetings: Mutex<HashMap<String, Meeting>>,
    rounds: Mutex<Vec<Round>>,
    verdicts: Mutex<Vec<ChairVerdict>>,
    syntheses: Mutex<Vec<Synthesis>>,
    events: Mutex<Vec<String>>,
    finished: Mutex<Option<(String, u64)>>,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pre-load a persisted meeting for resume tests.
    pub(crate) fn seed(&self, meeting: Meeting) {
        self.meetings
            .lock()
            .unwrap()
            .insert(meeting.id.to_string(), meeting);
    }

    pub(crate) fn saved_rounds(&self) -> usize {
        self.rounds.lock().unwrap().len()
    }

    pub(crate) fn finished_status(&self) -> Option<String> {
        self.finished
            .lock()
            .unwrap()
            .as_ref()
            .map(|(status, _)| status.clone())
    }

    pub(crate) fn event_names(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionStorePort for MockStore {
    fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError> {
        self.seed(meeting.clone());
        Ok(())
    }

    fn save_round(&self, _id: &MeetingId, round: &Round) -> Result<(), StoreError> {
        self.rounds.lock().unwrap().push(round.clone());
        Ok(())
    }

    fn save_verdict(&self, _id: &MeetingId, verdict: &ChairVerdict) -> Result<(), StoreError> {
        self.verdicts.lock().unwrap().push(verdict.clone());
        Ok(())
    }

    fn save_synthesis(&self, _id: &MeetingId, synthesis: &Synthesis) -> Result<(), StoreError> {
        self.syntheses.lock().unwrap().push(synthesis.clone());
        Ok(())
    }

    fn mark_finished(
        &self,
        _id: &MeetingId,
        status: &str,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        *self.finished.lock().unwrap() = Some((status.to_string(), elapsed_ms));
        Ok(())
    }

    fn append_event(&self, _id: &MeetingId, event: &MeetingEvent) -> Result<(), StoreError> {
        let name = serde_json::to_value(event)
            .ok()
            .and_then(|v| v["event"].as_str().map(str::to_string))
            .unwrap_or_default();
        self.events.lock().unwrap().push(name);
        Ok(())
    }

    fn load_meeting(&self, id: &MeetingId) -> Result<Meeting, StoreError> {
        self.meetings
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_meetings(&self) -> Result<Vec<MeetingSummary>, StoreError> {
        Ok(self
            .meetings
            .lock()
            .unwrap()
            .values()
            .map(|m| MeetingSummary {
                meeting_id: m.id.to_string(),
                agenda: m.agenda.content().to_string(),
                created_at_ms: m.created_at_ms,
                total_rounds: m.total_rounds(),
                status: if m.synthesis.is_some() {
                    "completed".to_string()
                } else {
                    "running".to_string()
                },
            })
            .collect())
    }
}

/// A response consisting of one tool-use block.
pub(crate) fn tool_use_response(id: &str, name: &str, args: &[(&str, &str)]) -> LlmResponse {
    use conclave_domain::{ContentBlock, StopReason};
    let input = args
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
        .collect();
    LlmResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        stop_reason: Some(StopReason::ToolUse),
        model: None,
    }
}

/// A response with several content blocks.
pub(crate) fn blocks_response(blocks: Vec<conclave_domain::ContentBlock>) -> LlmResponse {
    use conclave_domain::StopReason;
    LlmResponse {
        content: blocks,
        stop_reason: Some(StopReason::ToolUse),
        model: None,
    }
}
