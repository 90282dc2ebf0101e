//! Console progress rendering.
//!
//! Line-oriented progress on stderr so stdout stays clean for the
//! final report (and for `--output json` piping).

use conclave_application::{MeetingEvent, MeetingObserver};
use conclave_domain::ChairDecision;

pub struct ConsoleObserver;

impl MeetingObserver for ConsoleObserver {
    fn on_event(&self, event: &MeetingEvent) {
        match event {
            MeetingEvent::MeetingStarted {
                meeting_id,
                agenda,
                max_rounds,
            } => {
                eprintln!("Meeting {meeting_id}");
                eprintln!("Agenda: {agenda}");
                eprintln!("Round bound: {max_rounds}");
            }
            MeetingEvent::RoundStarted {
                round,
                max_rounds,
                question,
            } => {
                eprintln!();
                eprintln!("--- Round {}/{} ---", round + 1, max_rounds);
                eprintln!("Question: {question}");
            }
            MeetingEvent::ParticipantStarted { participant, .. } => {
                eprintln!("  {participant}: analyzing...");
            }
            MeetingEvent::ToolInvoked {
                participant, tool, seq, ..
            } => {
                eprintln!("  {participant}: [{seq}] {tool}");
            }
            MeetingEvent::ParticipantFinished {
                participant,
                success,
                duration_ms,
                ..
            } => {
                let outcome = if *success { "done" } else { "FAILED" };
                eprintln!("  {participant}: {outcome} ({:.1}s)", *duration_ms as f64 / 1000.0);
            }
            MeetingEvent::ChairDeciding { .. } => {
                eprintln!("  chair: reviewing round...");
            }
            MeetingEvent::ChairVerdictReached {
                decision,
                follow_up,
                format_error,
                ..
            } => match decision {
                ChairDecision::Continue => {
                    let question = follow_up.as_deref().unwrap_or("");
                    eprintln!("  chair: CONTINUE -> {question}");
                }
                ChairDecision::Done if *format_error => {
                    eprintln!("  chair: DONE (reply did not match the contract)");
                }
                ChairDecision::Done => eprintln!("  chair: DONE"),
            },
            MeetingEvent::SynthesisStarted { total_rounds } => {
                eprintln!();
                eprintln!("Synthesizing consensus from {total_rounds} round(s)...");
            }
            MeetingEvent::MeetingCompleted {
                total_rounds,
                elapsed_ms,
                ..
            } => {
                eprintln!(
                    "Meeting completed: {total_rounds} round(s) in {:.1}s",
                    *elapsed_ms as f64 / 1000.0
                );
            }
            MeetingEvent::MeetingAborted { round, failed, .. } => {
                let names: Vec<String> = failed.iter().map(|p| p.to_string()).collect();
                eprintln!(
                    "Meeting aborted in round {}: failed participants: {}",
                    round + 1,
                    names.join(", ")
                );
            }
        }
    }
}
