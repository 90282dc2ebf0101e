//! Chair decisions and synthesis.
//!
//! The chair is a plain-text session: it reviews round transcripts and
//! answers with `CONTINUE: <question>` or `DONE`, and at the end writes
//! the consensus report. Decision failures degrade to a forced Done so
//! a dead chair cannot hang a meeting; a synthesis failure is fatal,
//! because without the report there is nothing to deliver.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::observer::{MeetingEvent, MeetingObserver};
use crate::use_cases::prompts;
use conclave_domain::{ChairVerdict, Round, Synthesis};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChairEngine {
    gateway: Arc<dyn LlmGateway>,
    observer: Arc<dyn MeetingObserver>,
}

impl ChairEngine {
    pub fn new(gateway: Arc<dyn LlmGateway>, observer: Arc<dyn MeetingObserver>) -> Self {
        Self { gateway, observer }
    }

    /// Review the rounds so far and decide whether to continue.
    ///
    /// Never fails: a chair that cannot be reached, or that answers in
    /// an unrecognized shape, yields a Done verdict.
    pub async fn decide(
        &self,
        round_index: u32,
        agenda: &str,
        context: Option<&str>,
        rounds: &[Round],
    ) -> ChairVerdict {
        self.observer
            .on_event(&MeetingEvent::ChairDeciding { round: round_index });

        let verdict = match self.ask(prompts::chair_decision(agenda, context, rounds)).await {
            Ok(reply) => ChairVerdict::parse(reply, round_index),
            Err(e) => {
                warn!(error = %e, round = round_index, "chair unreachable, forcing Done");
                ChairVerdict::forced_done(round_index, format!("chair unreachable: {e}"))
            }
        };
        if verdict.format_error {
            warn!(round = round_index, raw = %verdict.raw, "chair reply did not match contract");
        }
        debug!(round = round_index, decision = ?verdict.decision, "chair verdict");

        self.observer.on_event(&MeetingEvent::ChairVerdictReached {
            round: round_index,
            decision: verdict.decision,
            follow_up: verdict.follow_up.clone(),
            format_error: verdict.format_error,
        });
        verdict
    }

    /// Write the final consensus report over the full history.
    pub async fn synthesize(
        &self,
        agenda: &str,
        context: Option<&str>,
        rounds: &[Round],
    ) -> Result<Synthesis, GatewayError> {
        self.observer.on_event(&MeetingEvent::SynthesisStarted {
            total_rounds: rounds.len() as u32,
        });
        let report = self
            .ask(prompts::chair_synthesis(agenda, context, rounds))
            .await?;
        Ok(Synthesis::new(report, rounds.len() as u32))
    }

    async fn ask(&self, prompt: String) -> Result<String, GatewayError> {
        let session = self
            .gateway
            .create_chair_session(&prompts::chair_system())
            .await?;
        session.send(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::observer::NoObserver;
    use crate::use_cases::testing::{MockGateway, CHAIR_KEY};
    use conclave_domain::{ChairDecision, LlmResponse, ParticipantId, ParticipantOutcome};

    fn history() -> Vec<Round> {
        vec![Round::new(
            0,
            "evaluate the error-handling strategy",
            vec![ParticipantOutcome::success(
                ParticipantId::new("gpt"),
                "main.go swallows errors.",
                5,
                vec![],
            )],
        )]
    }

    fn engine(gateway: Arc<MockGateway>) -> ChairEngine {
        ChairEngine::new(gateway, Arc::new(NoObserver))
    }

    #[tokio::test]
    async fn continue_reply_carries_follow_up_verbatim() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script(
            CHAIR_KEY,
            vec![LlmResponse::from_text("CONTINUE: which callers check the return value?")],
        );
        let verdict = engine(gateway).decide(0, "agenda", None, &history()).await;

        assert_eq!(verdict.decision, ChairDecision::Continue);
        assert_eq!(
            verdict.follow_up.as_deref(),
            Some("which callers check the return value?")
        );
    }

    #[tokio::test]
    async fn malformed_reply_coerces_to_done() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script(
            CHAIR_KEY,
            vec![LlmResponse::from_text("I think we should keep discussing this.")],
        );
        let verdict = engine(gateway).decide(1, "agenda", None, &history()).await;

        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(verdict.format_error);
    }

    #[tokio::test]
    async fn unreachable_chair_forces_done() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail(CHAIR_KEY);
        let verdict = engine(gateway).decide(2, "agenda", None, &history()).await;

        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(!verdict.format_error);
        assert!(verdict.raw.contains("chair unreachable"));
    }

    #[tokio::test]
    async fn synthesis_failure_is_an_error() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail(CHAIR_KEY);
        let result = engine(gateway).synthesize("agenda", None, &history()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn synthesis_counts_rounds() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script(CHAIR_KEY, vec![LlmResponse::from_text("## Consensus\n...")]);
        let synthesis = engine(gateway)
            .synthesize("agenda", None, &history())
            .await
            .unwrap();
        assert_eq!(synthesis.rounds_considered, 1);
        assert!(synthesis.report.starts_with("## Consensus"));
    }
}
