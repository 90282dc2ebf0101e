//! Top-level meeting orchestration.
//!
//! One meeting is a bounded loop: fan a question out to every
//! participant, let the chair review the transcript, either continue
//! with the chair's follow-up or stop, then synthesize the final
//! report. Every step is persisted as it happens so an interrupted
//! meeting can be resumed.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::observer::{MeetingEvent, MeetingObserver};
use crate::ports::session_store::{SessionStorePort, StoreError};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::chair::ChairEngine;
use crate::use_cases::prompts;
use crate::use_cases::run_participant::ParticipantRunner;
use crate::use_cases::run_round::{RoundCoordinator, RoundError};
use conclave_domain::{
    Agenda, ChairDecision, DomainError, Meeting, MeetingId, ParticipantId, Round, Synthesis,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum RunMeetingError {
    #[error("no participants configured")]
    NoParticipants,

    #[error("meeting aborted at round {round_index}: {} participants failed", .failures.len())]
    MeetingAborted {
        round_index: u32,
        failures: Vec<ParticipantId>,
    },

    #[error("synthesis failed: {0}")]
    SynthesisFailed(#[source] GatewayError),

    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Everything needed to start a meeting.
pub struct RunMeetingInput {
    pub agenda: String,
    pub context: Option<String>,
    pub participants: Vec<ParticipantId>,
    pub max_rounds: u32,
    /// Repository the participants gather evidence from.
    pub repo_root: String,
}

/// The delivered result of a completed meeting.
#[derive(Debug)]
pub struct MeetingReport {
    pub meeting_id: MeetingId,
    pub synthesis: Synthesis,
    pub rounds: Vec<Round>,
    pub elapsed_ms: u64,
}

pub struct MeetingOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    tools: Arc<dyn ToolExecutorPort>,
    store: Arc<dyn SessionStorePort>,
    observer: Arc<dyn MeetingObserver>,
    participant_deadline: Option<Duration>,
}

impl MeetingOrchestrator {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tools: Arc<dyn ToolExecutorPort>,
        store: Arc<dyn SessionStorePort>,
        observer: Arc<dyn MeetingObserver>,
        participant_deadline: Option<Duration>,
    ) -> Self {
        Self {
            gateway,
            tools,
            store,
            observer,
            participant_deadline,
        }
    }

    /// Run a meeting from scratch.
    pub async fn run(&self, input: RunMeetingInput) -> Result<MeetingReport, RunMeetingError> {
        if input.participants.is_empty() {
            return Err(RunMeetingError::NoParticipants);
        }
        let agenda = Agenda::new(&input.agenda)?;
        let meeting = Meeting::new(
            agenda,
            input.context.clone(),
            input.max_rounds,
            chrono::Utc::now().timestamp_millis() as u64,
        );
        self.store.create_meeting(&meeting)?;
        info!(meeting_id = %meeting.id, participants = input.participants.len(), "meeting created");

        let observer = self.recording_observer(meeting.id.clone());
        observer.on_event(&MeetingEvent::MeetingStarted {
            meeting_id: meeting.id.to_string(),
            agenda: input.agenda.clone(),
            max_rounds: input.max_rounds,
        });

        let first_question = meeting.agenda.content().to_string();
        self.drive(meeting, &input.participants, &input.repo_root, first_question, observer)
            .await
    }

    /// Pick up a persisted meeting that has no synthesis yet.
    pub async fn resume(
        &self,
        id: &MeetingId,
        participants: &[ParticipantId],
        repo_root: &str,
    ) -> Result<MeetingReport, RunMeetingError> {
        if participants.is_empty() {
            return Err(RunMeetingError::NoParticipants);
        }
        let mut meeting = self.store.load_meeting(id)?;
        info!(meeting_id = %meeting.id, rounds = meeting.total_rounds(), "meeting resumed");

        // A completed meeting already has its report; no backend
        // traffic happens on this path.
        if let Some(synthesis) = meeting.synthesis.clone() {
            return Ok(MeetingReport {
                meeting_id: meeting.id,
                synthesis,
                rounds: meeting.rounds,
                elapsed_ms: 0,
            });
        }
        let observer = self.recording_observer(meeting.id.clone());

        // A meeting interrupted mid-decision has a saved but unsealed
        // last round; the chair picks up exactly there.
        if meeting.last_round().is_some_and(|r| !r.is_sealed()) {
            let chair = ChairEngine::new(Arc::clone(&self.gateway), Arc::clone(&observer));
            let next = self.settle_verdict(&chair, &mut meeting).await?;
            return match next {
                Some(question) => {
                    self.drive(meeting, participants, repo_root, question, observer)
                        .await
                }
                None => self.finish(meeting, observer).await,
            };
        }

        // Otherwise the last verdict decides: a Continue under the
        // bound carries its follow-up, anything else goes to synthesis.
        let next_question = match meeting.last_round().and_then(|r| r.verdict.as_ref()) {
            Some(v) if v.is_continue() && meeting.total_rounds() < meeting.max_rounds => {
                v.follow_up.clone()
            }
            Some(_) => None,
            None => Some(meeting.agenda.content().to_string()),
        };

        match next_question {
            Some(question) => {
                self.drive(meeting, participants, repo_root, question, observer)
                    .await
            }
            None => self.finish(meeting, observer).await,
        }
    }

    /// The round loop, from `question` until the chair (or the bound)
    /// says Done, then synthesis.
    async fn drive(
        &self,
        mut meeting: Meeting,
        participants: &[ParticipantId],
        repo_root: &str,
        mut question: String,
        observer: Arc<dyn MeetingObserver>,
    ) -> Result<MeetingReport, RunMeetingError> {
        let runner = Arc::new(ParticipantRunner::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.tools),
            Arc::clone(&observer),
        ));
        let coordinator = RoundCoordinator::new(
            Arc::clone(&runner),
            Arc::clone(&observer),
            self.participant_deadline,
        );
        let chair = ChairEngine::new(Arc::clone(&self.gateway), Arc::clone(&observer));
        let system_prompt = prompts::participant_system(repo_root);
        let started = Instant::now();
        let agenda = meeting.agenda.content().to_string();
        let context = meeting.context.clone();

        loop {
            let round_index = meeting.total_rounds();
            observer.on_event(&MeetingEvent::RoundStarted {
                round: round_index,
                max_rounds: meeting.max_rounds,
                question: question.clone(),
            });
            let prompt = if round_index == 0 {
                prompts::participant_initial(&agenda, context.as_deref())
            } else {
                prompts::participant_follow_up(&agenda, context.as_deref(), &question)
            };

            let round = match coordinator
                .run(round_index, participants, &system_prompt, &question, &prompt)
                .await
            {
                Ok(round) => round,
                Err(RoundError::MajorityFailed { round, failed }) => {
                    self.store.save_round(&meeting.id, &round)?;
                    observer.on_event(&MeetingEvent::MeetingAborted {
                        meeting_id: meeting.id.to_string(),
                        round: round_index,
                        failed: failed.clone(),
                    });
                    self.store.mark_finished(
                        &meeting.id,
                        "aborted",
                        started.elapsed().as_millis() as u64,
                    )?;
                    error!(meeting_id = %meeting.id, round = round_index, "meeting aborted");
                    return Err(RunMeetingError::MeetingAborted {
                        round_index,
                        failures: failed,
                    });
                }
            };
            self.store.save_round(&meeting.id, &round)?;
            meeting.push_round(round)?;

            match self.settle_verdict(&chair, &mut meeting).await? {
                Some(follow_up) => question = follow_up,
                None => break,
            }
        }

        self.finish_timed(meeting, observer, started).await
    }

    /// Ask the chair about the last round, persist and seal the
    /// verdict. At the round bound a Continue is downgraded to Done
    /// (the bound is never exceeded; the raw reply stays on record).
    /// Returns the follow-up question when the meeting continues.
    async fn settle_verdict(
        &self,
        chair: &ChairEngine,
        meeting: &mut Meeting,
    ) -> Result<Option<String>, RunMeetingError> {
        let round_index = meeting.total_rounds().saturating_sub(1);
        let agenda = meeting.agenda.content().to_string();
        let context = meeting.context.clone();
        let mut verdict = chair
            .decide(round_index, &agenda, context.as_deref(), &meeting.rounds)
            .await;
        if verdict.is_continue() && meeting.total_rounds() >= meeting.max_rounds {
            info!(meeting_id = %meeting.id, round = round_index, "continue downgraded to done at the round bound");
            verdict = verdict.downgraded_to_done();
        }
        self.store.save_verdict(&meeting.id, &verdict)?;
        let next = match verdict.decision {
            ChairDecision::Continue => verdict.follow_up.clone(),
            ChairDecision::Done => None,
        };
        if let Some(round) = meeting.last_round_mut() {
            round.seal(verdict)?;
        }
        Ok(next)
    }

    async fn finish(
        &self,
        meeting: Meeting,
        observer: Arc<dyn MeetingObserver>,
    ) -> Result<MeetingReport, RunMeetingError> {
        self.finish_timed(meeting, observer, Instant::now()).await
    }

    async fn finish_timed(
        &self,
        mut meeting: Meeting,
        observer: Arc<dyn MeetingObserver>,
        started: Instant,
    ) -> Result<MeetingReport, RunMeetingError> {
        let chair = ChairEngine::new(Arc::clone(&self.gateway), Arc::clone(&observer));
        let synthesis = match chair
            .synthesize(
                meeting.agenda.content(),
                meeting.context.as_deref(),
                &meeting.rounds,
            )
            .await
        {
            Ok(synthesis) => synthesis,
            Err(e) => {
                self.store.mark_finished(
                    &meeting.id,
                    "aborted",
                    started.elapsed().as_millis() as u64,
                )?;
                return Err(RunMeetingError::SynthesisFailed(e));
            }
        };
        meeting.record_synthesis(synthesis.clone())?;
        self.store.save_synthesis(&meeting.id, &synthesis)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.store.mark_finished(&meeting.id, "completed", elapsed_ms)?;
        observer.on_event(&MeetingEvent::MeetingCompleted {
            meeting_id: meeting.id.to_string(),
            total_rounds: meeting.total_rounds(),
            elapsed_ms,
        });
        info!(meeting_id = %meeting.id, rounds = meeting.total_rounds(), "meeting completed");

        Ok(MeetingReport {
            meeting_id: meeting.id,
            synthesis,
            rounds: meeting.rounds,
            elapsed_ms,
        })
    }

    /// Observer that also appends every event to the meeting's log.
    fn recording_observer(&self, id: MeetingId) -> Arc<dyn MeetingObserver> {
        Arc::new(RecordingObserver {
            inner: Arc::clone(&self.observer),
            store: Arc::clone(&self.store),
            id,
        })
    }
}

struct RecordingObserver {
    inner: Arc<dyn MeetingObserver>,
    store: Arc<dyn SessionStorePort>,
    id: MeetingId,
}

impl MeetingObserver for RecordingObserver {
    fn on_event(&self, event: &MeetingEvent) {
        self.inner.on_event(event);
        if let Err(e) = self.store.append_event(&self.id, event) {
            warn!(meeting_id = %self.id, error = %e, "failed to append event");
        }
    }
}
