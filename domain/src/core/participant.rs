//! Participant identity

use serde::{Deserialize, Serialize};

/// Identifier of one model-backed analyst in a meeting.
///
/// Stable across rounds; the round transcript is keyed by it. The id is
/// a short human-chosen name ("gpt", "claude", ...), not a model id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Wire dialect a backend speaks for tool calling.
///
/// The orchestrator never branches on this; only the adapter layer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-style chat completions (`tool_calls`, stringified arguments)
    OpenAi,
    /// Anthropic-style messages (`tool_use`/`tool_result` content blocks)
    Anthropic,
}

impl BackendKind {
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "anthropic" | "claude" => Ok(BackendKind::Anthropic),
            other => Err(format!("unknown backend kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_display() {
        let id = ParticipantId::new("gpt");
        assert_eq!(id.to_string(), "gpt");
        assert_eq!(id.as_str(), "gpt");
    }

    #[test]
    fn backend_kind_parse() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!(
            "Anthropic".parse::<BackendKind>().unwrap(),
            BackendKind::Anthropic
        );
        assert!("cohere".parse::<BackendKind>().is_err());
    }
}
