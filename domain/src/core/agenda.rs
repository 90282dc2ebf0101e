//! Agenda value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The topic a meeting deliberates on (Value Object)
///
/// Round 0 poses the agenda verbatim to every participant; later rounds
/// pose the chair's follow-up question instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agenda {
    content: String,
}

impl Agenda {
    /// Create a new agenda, rejecting empty or whitespace-only text.
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyAgenda);
        }
        Ok(Self { content })
    }

    /// Get the agenda text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Agenda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Agenda {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Agenda::new(s)
    }
}

impl TryFrom<String> for Agenda {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Agenda::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agenda_creation() {
        let a = Agenda::new("evaluate error-handling strategy").unwrap();
        assert_eq!(a.content(), "evaluate error-handling strategy");
    }

    #[test]
    fn empty_agenda_rejected() {
        assert!(Agenda::new("").is_err());
        assert!(Agenda::new("   \n").is_err());
    }

    #[test]
    fn try_from_str() {
        let a: Agenda = "review the logging setup".try_into().unwrap();
        assert_eq!(a.to_string(), "review the logging setup");
    }
}
