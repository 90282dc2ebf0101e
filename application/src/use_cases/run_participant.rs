//! One participant's tool-calling turn.
//!
//! The runner drives the multi-turn loop: send the prompt with the tool
//! vocabulary, execute whatever the model requests, return the results,
//! repeat until the model answers in free text or a bound trips. A turn
//! always settles into a [`ParticipantOutcome`]; backend failures are
//! folded in as structured failure data, never propagated as `Err`.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, ToolResultMessage};
use crate::ports::observer::{MeetingEvent, MeetingObserver};
use crate::ports::tool_executor::ToolExecutorPort;
use conclave_domain::{
    FailureKind, InvocationRecord, ParticipantFailure, ParticipantId, ParticipantOutcome,
    ToolError, ToolResult,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Hard ceiling on send/execute iterations within one turn.
pub const MAX_TOOL_ITERATIONS: u32 = 50;

/// Invocation payloads are truncated to this many bytes in the audit
/// record; the full payload still goes back to the model.
const RECORD_PAYLOAD_CEILING: usize = 4096;

pub struct ParticipantRunner {
    gateway: Arc<dyn LlmGateway>,
    tools: Arc<dyn ToolExecutorPort>,
    observer: Arc<dyn MeetingObserver>,
}

impl ParticipantRunner {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tools: Arc<dyn ToolExecutorPort>,
        observer: Arc<dyn MeetingObserver>,
    ) -> Self {
        Self {
            gateway,
            tools,
            observer,
        }
    }

    /// Run one turn to completion.
    pub async fn run(
        &self,
        round: u32,
        participant: &ParticipantId,
        system_prompt: &str,
        prompt: &str,
    ) -> ParticipantOutcome {
        let started = Instant::now();
        let mut invocations: Vec<InvocationRecord> = Vec::new();
        let mut seq: u32 = 0;

        let session = match self
            .gateway
            .create_participant_session(participant, system_prompt)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                return self.settle_failure(participant, &e, started, invocations);
            }
        };
        debug!(participant = %participant, backend = session.backend(), "participant turn started");

        let definitions = self.tools.tool_definitions();
        let mut response = match session.send_with_tools(prompt, definitions).await {
            Ok(response) => response,
            Err(e) => {
                return self.settle_failure(participant, &e, started, invocations);
            }
        };

        for _ in 0..MAX_TOOL_ITERATIONS {
            if !response.has_tool_calls() {
                let text = response.text_content();
                return ParticipantOutcome::success(
                    participant.clone(),
                    text,
                    started.elapsed().as_millis() as u64,
                    invocations,
                );
            }

            let calls = response.tool_calls();
            // One future per requested call; join_all keeps result
            // order aligned with request order regardless of which
            // execution finishes first.
            let executions = calls.iter().map(|call| async {
                match &call.decode_error {
                    Some(reason) => ToolResult::failure(
                        &call.tool_name,
                        ToolError::invalid_argument(reason.clone()),
                    ),
                    None => self.tools.execute(call).await,
                }
            });
            let results: Vec<ToolResult> = join_all(executions).await;

            let mut messages = Vec::with_capacity(calls.len());
            for (call, result) in calls.iter().zip(results.iter()) {
                seq += 1;
                self.observer.on_event(&MeetingEvent::ToolInvoked {
                    round,
                    participant: participant.clone(),
                    tool: call.tool_name.clone(),
                    seq,
                });
                let payload = result.payload_text();
                invocations.push(InvocationRecord {
                    seq,
                    tool_name: call.tool_name.clone(),
                    arguments: call.arguments.clone(),
                    success: result.is_success(),
                    payload: truncate_payload(&payload),
                });
                messages.push(ToolResultMessage {
                    tool_use_id: call.native_id.clone().unwrap_or_default(),
                    tool_name: call.tool_name.clone(),
                    output: payload,
                    is_error: !result.is_success(),
                });
            }

            response = match session.send_tool_results(&messages).await {
                Ok(response) => response,
                Err(e) => {
                    return self.settle_failure(participant, &e, started, invocations);
                }
            };
        }

        warn!(participant = %participant, "tool-call loop hit iteration ceiling");
        ParticipantOutcome::failed(
            participant.clone(),
            ParticipantFailure::new(
                FailureKind::MaxIterations,
                format!("{} send/execute iterations", MAX_TOOL_ITERATIONS),
            ),
            started.elapsed().as_millis() as u64,
            invocations,
        )
    }

    fn settle_failure(
        &self,
        participant: &ParticipantId,
        error: &GatewayError,
        started: Instant,
        invocations: Vec<InvocationRecord>,
    ) -> ParticipantOutcome {
        let kind = match error {
            GatewayError::Timeout => FailureKind::Timeout,
            _ => FailureKind::Transport,
        };
        warn!(participant = %participant, error = %error, "participant turn failed");
        ParticipantOutcome::failed(
            participant.clone(),
            ParticipantFailure::new(kind, error.to_string()),
            started.elapsed().as_millis() as u64,
            invocations,
        )
    }
}

fn truncate_payload(payload: &str) -> String {
    if payload.len() <= RECORD_PAYLOAD_CEILING {
        return payload.to_string();
    }
    let mut cut = RECORD_PAYLOAD_CEILING;
    while !payload.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\n[payload truncated]", &payload[..cut])
}
