//! Meeting entities: [`Meeting`], [`Round`], [`Synthesis`].

use crate::core::agenda::Agenda;
use crate::core::error::DomainError;
use crate::meeting::outcome::ParticipantOutcome;
use crate::meeting::verdict::ChairVerdict;
use serde::{Deserialize, Serialize};

/// Globally unique meeting identifier (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(String);

impl MeetingId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One deliberation round: a question, all participant outcomes in
/// launch order, and the chair's verdict once sealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub index: u32,
    pub question: String,
    pub outcomes: Vec<ParticipantOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ChairVerdict>,
}

impl Round {
    pub fn new(index: u32, question: impl Into<String>, outcomes: Vec<ParticipantOutcome>) -> Self {
        Self {
            index,
            question: question.into(),
            outcomes,
            verdict: None,
        }
    }

    /// Record the verdict, sealing the round.
    pub fn seal(&mut self, verdict: ChairVerdict) -> Result<(), DomainError> {
        if self.verdict.is_some() {
            return Err(DomainError::RoundSealed(self.index));
        }
        self.verdict = Some(verdict);
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.verdict.is_some()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// The final consensus report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub report: String,
    /// How many rounds the report was computed from.
    pub rounds_considered: u32,
}

impl Synthesis {
    pub fn new(report: impl Into<String>, rounds_considered: u32) -> Self {
        Self {
            report: report.into(),
            rounds_considered,
        }
    }
}

/// A full deliberation: agenda, bounded rounds, terminal synthesis.
///
/// Rounds are append-only with contiguous 0-based indices. Once the
/// synthesis is recorded the meeting is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub agenda: Agenda,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub max_rounds: u32,
    /// Unix millis at creation.
    pub created_at_ms: u64,
    pub rounds: Vec<Round>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<Synthesis>,
}

impl Meeting {
    pub fn new(agenda: Agenda, context: Option<String>, max_rounds: u32, created_at_ms: u64) -> Self {
        Self {
            id: MeetingId::generate(),
            agenda,
            context,
            max_rounds,
            created_at_ms,
            rounds: Vec::new(),
            synthesis: None,
        }
    }

    /// Append a round. The index must continue the sequence with no gap.
    pub fn push_round(&mut self, round: Round) -> Result<(), DomainError> {
        if self.synthesis.is_some() {
            return Err(DomainError::SynthesisAlreadyRecorded(self.id.to_string()));
        }
        debug_assert_eq!(round.index as usize, self.rounds.len());
        self.rounds.push(round);
        Ok(())
    }

    pub fn record_synthesis(&mut self, synthesis: Synthesis) -> Result<(), DomainError> {
        if self.synthesis.is_some() {
            return Err(DomainError::SynthesisAlreadyRecorded(self.id.to_string()));
        }
        self.synthesis = Some(synthesis);
        Ok(())
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn last_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.last_mut()
    }
}
