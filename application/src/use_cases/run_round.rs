//! Fan-out of one round across all participants.
//!
//! Every participant runs concurrently on its own task; the round is
//! reassembled in launch order once all tasks settle, so the transcript
//! reads the same no matter which backend answered first. A round where
//! failures reach parity with successes is not worth a chair review and
//! aborts the meeting.

use crate::ports::observer::{MeetingEvent, MeetingObserver};
use crate::use_cases::run_participant::ParticipantRunner;
use conclave_domain::{
    FailureKind, ParticipantFailure, ParticipantId, ParticipantOutcome, Round,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RoundError {
    /// Failed participants reached or outnumbered successful ones.
    /// The round is carried so the abort can still be persisted.
    #[error("round {} aborted: {} of {} participants failed", .round.index, .failed.len(), .round.outcomes.len())]
    MajorityFailed {
        round: Round,
        failed: Vec<ParticipantId>,
    },
}

pub struct RoundCoordinator {
    runner: Arc<ParticipantRunner>,
    observer: Arc<dyn MeetingObserver>,
    /// Per-participant wall-clock bound for one turn, if any.
    participant_deadline: Option<Duration>,
}

impl RoundCoordinator {
    pub fn new(
        runner: Arc<ParticipantRunner>,
        observer: Arc<dyn MeetingObserver>,
        participant_deadline: Option<Duration>,
    ) -> Self {
        Self {
            runner,
            observer,
            participant_deadline,
        }
    }

    /// Run one round: `question` goes into the record, `prompt` is what
    /// each participant actually receives.
    pub async fn run(
        &self,
        round_index: u32,
        participants: &[ParticipantId],
        system_prompt: &str,
        question: &str,
        prompt: &str,
    ) -> Result<Round, RoundError> {
        let mut tasks: JoinSet<(usize, ParticipantOutcome)> = JoinSet::new();
        for (slot, participant) in participants.iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let observer = Arc::clone(&self.observer);
            let participant = participant.clone();
            let system_prompt = system_prompt.to_string();
            let prompt = prompt.to_string();
            let deadline = self.participant_deadline;

            tasks.spawn(async move {
                observer.on_event(&MeetingEvent::ParticipantStarted {
                    round: round_index,
                    participant: participant.clone(),
                });
                let started = Instant::now();
                let outcome = match deadline {
                    Some(limit) => {
                        match tokio::time::timeout(
                            limit,
                            runner.run(round_index, &participant, &system_prompt, &prompt),
                        )
                        .await
                        {
                            Ok(outcome) => outcome,
                            Err(_) => ParticipantOutcome::failed(
                                participant.clone(),
                                ParticipantFailure::new(
                                    FailureKind::Timeout,
                                    format!("turn deadline of {}s exceeded", limit.as_secs()),
                                ),
                                started.elapsed().as_millis() as u64,
                                vec![],
                            ),
                        }
                    }
                    None => runner.run(round_index, &participant, &system_prompt, &prompt).await,
                };
                observer.on_event(&MeetingEvent::ParticipantFinished {
                    round: round_index,
                    participant: participant.clone(),
                    success: outcome.is_success(),
                    duration_ms: outcome.duration_ms,
                });
                (slot, outcome)
            });
        }

        // Settle every task, then reassemble by launch slot.
        let mut slots: Vec<Option<ParticipantOutcome>> = vec![None; participants.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(e) => warn!(error = %e, "participant task did not settle"),
            }
        }
        let outcomes: Vec<ParticipantOutcome> = slots
            .into_iter()
            .zip(participants.iter())
            .map(|(slot, participant)| {
                slot.unwrap_or_else(|| {
                    ParticipantOutcome::failed(
                        participant.clone(),
                        ParticipantFailure::new(FailureKind::Transport, "task panicked"),
                        0,
                        vec![],
                    )
                })
            })
            .collect();

        let round = Round::new(round_index, question, outcomes);
        info!(
            round = round_index,
            succeeded = round.success_count(),
            failed = round.failure_count(),
            "round settled"
        );

        if round.failure_count() >= round.success_count() {
            let failed = round
                .outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| o.participant.clone())
                .collect();
            return Err(RoundError::MajorityFailed { round, failed });
        }
        Ok(round)
    }
}
