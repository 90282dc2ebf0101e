//! Prompt builders for participants and the chair.
//!
//! The chair's output contract (`CONTINUE: <question>` / `DONE`) is
//! load-bearing: [`conclave_domain::ChairVerdict::parse`] relies on it.

use conclave_domain::Round;

/// System framing for a participant's tool-calling turn.
pub fn participant_system(repo_root: &str) -> String {
    format!(
        r#"You are a codebase analyst working on a local repository.
Repository root: {repo_root}

You have four read-only tools:
- find_files(pattern): locate files by glob pattern relative to the repository root
- search_content(query, glob): search file contents by regex, optionally scoped by a glob
- read_file(path, start_line, end_line): read a file snippet by line range
- diff_changes(base): show the version-control diff against a base ref

Rules:
1) Never guess repository contents. When you need a fact, use a tool.
2) Keep tool use economical: locate with find_files/search_content, then read only what you need.
3) Never request or reveal secrets. Refuse and explain if asked.
4) Once you have enough evidence, give a direct analysis.
5) Cite file paths and line ranges when you reference code."#
    )
}

/// Round-0 prompt: the agenda itself.
pub fn participant_initial(agenda: &str, context: Option<&str>) -> String {
    let mut prompt = format!("## Deliberation round\n\n**Agenda:**\n{agenda}\n");
    if let Some(ctx) = context {
        prompt.push_str("\n**Context:**\n");
        prompt.push_str(ctx);
        prompt.push('\n');
    }
    prompt.push_str("\nGather evidence with your tools, then give your analysis of the agenda.");
    prompt
}

/// Later rounds: the chair's follow-up, with the original agenda kept
/// in view.
pub fn participant_follow_up(agenda: &str, context: Option<&str>, question: &str) -> String {
    let mut prompt = format!("## Deliberation round (follow-up)\n\n**Original agenda:**\n{agenda}\n");
    if let Some(ctx) = context {
        prompt.push_str("\n**Context:**\n");
        prompt.push_str(ctx);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\n**Chair's follow-up question:**\n{question}\n\nGather evidence with your tools, then answer the question above."
    ));
    prompt
}

/// System framing for the chair (both decisions and synthesis).
pub fn chair_system() -> String {
    "You chair a deliberation between several independent codebase analysts. \
     You weigh their findings, identify gaps, and synthesize consensus. \
     You never call tools yourself."
        .to_string()
}

/// Round-review prompt asking for CONTINUE/DONE.
pub fn chair_decision(agenda: &str, context: Option<&str>, rounds: &[Round]) -> String {
    let mut prompt = format!("You are reviewing analyst responses.\n\nOriginal agenda:\n{agenda}\n");
    if let Some(ctx) = context {
        prompt.push_str("\nContext:\n");
        prompt.push_str(ctx);
        prompt.push('\n');
    }
    prompt.push_str(&rounds_block(rounds));
    prompt.push_str(
        r#"
## Task

Review ALL responses above and decide whether a follow-up round is needed.

Rules:
1. If an important aspect was missed, ask one focused follow-up question.
2. If responses contradict each other, ask for clarification.
3. If the evidence gathered is sufficient, end the discussion.
4. Ask at most ONE question.

Output format (exact):
- Follow-up needed: "CONTINUE: <your question>"
- Sufficient: "DONE"
"#,
    );
    prompt
}

/// Final-report prompt over the whole history.
pub fn chair_synthesis(agenda: &str, context: Option<&str>, rounds: &[Round]) -> String {
    let mut prompt = format!(
        "You are synthesizing a multi-round deliberation into a final report.\n\nOriginal agenda:\n{agenda}\n"
    );
    if let Some(ctx) = context {
        prompt.push_str("\nContext:\n");
        prompt.push_str(ctx);
        prompt.push('\n');
    }
    prompt.push_str(&rounds_block(rounds));
    prompt.push_str(
        r#"
## Task

Produce a structured consensus report covering:

### Topic
One-paragraph restatement of the agenda.

### Key claims per analyst
For each analyst: their main claims, the evidence cited (file paths,
line ranges), and a confidence level (H/M/L).

### Consensus
What the analysts agree on, strongest evidence first.

### Divergence
Where they disagree and on what grounds.

### Assessment
Your overall judgement as chair.

### Recommendation
The best course of action, with alternatives if any.

Failed analysts are marked in the transcript; note any round where
coverage was reduced.
"#,
    );
    prompt
}

/// Render the full round history. Failed participants appear
/// explicitly so reduced coverage is never silently dropped.
fn rounds_block(rounds: &[Round]) -> String {
    let mut out = String::new();
    for round in rounds {
        out.push_str(&format!("\n=== Round {} ===\n", round.index + 1));
        out.push_str(&format!("Question: {}\n", round.question));
        for outcome in &round.outcomes {
            match outcome.text() {
                Some(text) => {
                    out.push_str(&format!("\n{}: {}\n", outcome.participant, text));
                }
                None => {
                    let failure = outcome
                        .failure()
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "unknown failure".to_string());
                    out.push_str(&format!(
                        "\n{} [FAILED — no analysis this round: {}]\n",
                        outcome.participant, failure
                    ));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{FailureKind, ParticipantFailure, ParticipantId, ParticipantOutcome};

    #[test]
    fn decision_prompt_carries_contract_and_history() {
        let rounds = vec![Round::new(
            0,
            "evaluate error-handling strategy",
            vec![ParticipantOutcome::success(
                ParticipantId::new("gpt"),
                "main.go has no error handling.",
                5,
                vec![],
            )],
        )];
        let prompt = chair_decision("evaluate error-handling strategy", None, &rounds);
        assert!(prompt.contains("CONTINUE: <your question>"));
        assert!(prompt.contains("=== Round 1 ==="));
        assert!(prompt.contains("main.go has no error handling."));
    }

    #[test]
    fn failed_participants_are_visible_in_history() {
        let rounds = vec![Round::new(
            0,
            "q",
            vec![ParticipantOutcome::failed(
                ParticipantId::new("claude"),
                ParticipantFailure::new(FailureKind::Timeout, "deadline exceeded"),
                5,
                vec![],
            )],
        )];
        let prompt = chair_synthesis("q", None, &rounds);
        assert!(prompt.contains("claude [FAILED"));
        assert!(prompt.contains("timeout: deadline exceeded"));
    }
}
