//! Chair verdict parsing.
//!
//! The chair answers a round review with either `CONTINUE: <question>`
//! or `DONE`. Parsing is tolerant but biased toward termination: any
//! shape that is not a recognizable CONTINUE is Done, never an error,
//! so a confused chair can stall a meeting at most zero extra rounds.

use serde::{Deserialize, Serialize};

/// The chair's decision for a sealed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChairDecision {
    Continue,
    Done,
}

/// One chair verdict, recorded on the round it was computed for.
///
/// Invariant: `follow_up` is `Some` (and non-empty) iff `decision` is
/// `Continue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChairVerdict {
    pub decision: ChairDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    pub round_index: u32,
    /// The chair's raw reply, kept for diagnostics.
    pub raw: String,
    /// True when the reply matched neither accepted shape and the
    /// decision was coerced to Done.
    #[serde(default)]
    pub format_error: bool,
}

impl ChairVerdict {
    /// Parse a chair reply.
    ///
    /// Rule: the reply is trimmed. A case-insensitive `CONTINUE:`
    /// prefix yields Continue with the trimmed remainder as follow-up;
    /// an empty remainder coerces to Done. A bare case-insensitive
    /// `DONE` (optional trailing period) is Done. Anything else is a
    /// format error, coerced to Done with the raw text preserved.
    pub fn parse(raw: impl Into<String>, round_index: u32) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();

        let continue_prefix = trimmed
            .get(..9)
            .is_some_and(|p| p.eq_ignore_ascii_case("continue:"));
        if continue_prefix {
            let follow_up = trimmed[9..].trim();
            if !follow_up.is_empty() {
                return Self {
                    decision: ChairDecision::Continue,
                    follow_up: Some(follow_up.to_string()),
                    round_index,
                    raw,
                    format_error: false,
                };
            }
            // CONTINUE with nothing to ask is treated as sufficient.
            return Self::done_with(round_index, raw, false);
        }

        let bare = trimmed.trim_end_matches('.');
        if bare.eq_ignore_ascii_case("done") {
            return Self::done_with(round_index, raw, false);
        }

        Self::done_with(round_index, raw, true)
    }

    /// A Done verdict produced by the orchestrator itself (round bound
    /// reached, or chair unreachable).
    pub fn forced_done(round_index: u32, reason: impl Into<String>) -> Self {
        Self::done_with(round_index, reason.into(), false)
    }

    fn done_with(round_index: u32, raw: String, format_error: bool) -> Self {
        Self {
            decision: ChairDecision::Done,
            follow_up: None,
            round_index,
            raw,
            format_error,
        }
    }

    /// Downgrade a Continue verdict to Done at the round bound. The
    /// chair's raw reply is kept for diagnostics.
    pub fn downgraded_to_done(mut self) -> Self {
        self.decision = ChairDecision::Done;
        self.follow_up = None;
        self
    }

    pub fn is_continue(&self) -> bool {
        self.decision == ChairDecision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_continue_round_trips_verbatim() {
        let verdict = ChairVerdict::parse("CONTINUE: what logging library is used?", 0);
        assert!(verdict.is_continue());
        assert_eq!(
            verdict.follow_up.as_deref(),
            Some("what logging library is used?")
        );
        assert!(!verdict.format_error);
    }

    #[test]
    fn continue_tolerates_case_and_whitespace() {
        let verdict = ChairVerdict::parse("  continue:   Which tests cover the parser?  \n", 2);
        assert!(verdict.is_continue());
        assert_eq!(
            verdict.follow_up.as_deref(),
            Some("Which tests cover the parser?")
        );
        assert_eq!(verdict.round_index, 2);
    }

    #[test]
    fn empty_follow_up_coerces_to_done() {
        let verdict = ChairVerdict::parse("CONTINUE:   ", 1);
        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(verdict.follow_up.is_none());
        assert!(!verdict.format_error);
    }

    #[test]
    fn done_variants() {
        for reply in ["DONE", "done", " Done. ", "DONE."] {
            let verdict = ChairVerdict::parse(reply, 0);
            assert_eq!(verdict.decision, ChairDecision::Done, "reply: {reply:?}");
            assert!(!verdict.format_error, "reply: {reply:?}");
        }
    }

    #[test]
    fn unrecognized_reply_is_format_error_done() {
        let verdict = ChairVerdict::parse("The discussion seems complete to me.", 3);
        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(verdict.format_error);
        assert_eq!(verdict.raw, "The discussion seems complete to me.");
    }

    #[test]
    fn continue_without_colon_is_format_error() {
        let verdict = ChairVerdict::parse("CONTINUE asking about logging", 0);
        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(verdict.format_error);
    }

    #[test]
    fn downgrade_keeps_the_raw_reply() {
        let verdict = ChairVerdict::parse("CONTINUE: one more angle", 2).downgraded_to_done();
        assert_eq!(verdict.decision, ChairDecision::Done);
        assert!(verdict.follow_up.is_none());
        assert_eq!(verdict.raw, "CONTINUE: one more angle");
        assert!(!verdict.format_error);
    }

    #[test]
    fn verdict_serde_round_trip() {
        let verdict = ChairVerdict::parse("CONTINUE: dig into the retry logic", 1);
        let json = serde_json::to_string(&verdict).unwrap();
        let back: ChairVerdict = serde_json::from_str(&json).unwrap();
        assert!(back.is_continue());
        assert_eq!(back.follow_up.as_deref(), Some("dig into the retry logic"));
    }
}
