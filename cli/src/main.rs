//! CLI entrypoint for conclave
//!
//! Wires the layers together with dependency injection: config to
//! gateway, toolkit, and store, then hands the assembled orchestrator
//! an agenda.

mod observer;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use conclave_application::{
    MeetingObserver, MeetingOrchestrator, MeetingReport, NoObserver, RunMeetingInput,
};
use conclave_domain::{MeetingId, ParticipantId};
use conclave_infrastructure::{
    BackendConfig, ConclaveConfig, EvidenceToolkit, FsSessionStore, HttpLlmGateway,
};
use observer::ConsoleObserver;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "conclave",
    about = "Multi-agent codebase deliberation: parallel analysts, a chair, one consensus report"
)]
struct Cli {
    /// The agenda: the question or decision to deliberate
    agenda: Option<String>,

    /// Repository the participants gather evidence from
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,

    /// Extra background given to every participant
    #[arg(long)]
    context: Option<String>,

    /// Override the configured round bound
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Resume a persisted meeting by id
    #[arg(long, value_name = "MEETING_ID", conflicts_with = "agenda")]
    resume: Option<String>,

    /// List persisted meetings, newest first
    #[arg(long)]
    list_sessions: bool,

    /// Extra config file, merged over ./conclave.toml and the global one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// What to print when the meeting completes
    #[arg(long, value_enum, default_value_t = OutputFormat::Full)]
    output: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Round-by-round transcript plus the synthesis
    Full,
    /// The synthesis report only
    Synthesis,
    /// Machine-readable JSON on stdout
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ConclaveConfig::load(cli.config.as_ref())
        .map_err(|e| anyhow!("configuration error: {e}"))?;

    let store = FsSessionStore::new(config.resolved_session_dir())
        .context("failed to open session store")?;

    if cli.list_sessions {
        return list_sessions(&store);
    }

    if config.participants.is_empty() {
        bail!(
            "no participants configured; add [[participants]] entries to conclave.toml \
             (id, backend, model, base_url, api_key_env)"
        );
    }
    let chair = chair_config(&config);
    let participants: Vec<ParticipantId> = config
        .participants
        .iter()
        .map(|p| ParticipantId::new(&p.id))
        .collect();

    let gateway = Arc::new(
        HttpLlmGateway::new(config.participants.clone(), chair)
            .map_err(|e| anyhow!("failed to build backend gateway: {e}"))?,
    );
    let toolkit = Arc::new(
        EvidenceToolkit::new(&cli.repo_root)
            .map_err(|e| anyhow!("invalid --repo-root: {e}"))?,
    );
    let observer: Arc<dyn MeetingObserver> = if cli.quiet {
        Arc::new(NoObserver)
    } else {
        Arc::new(ConsoleObserver)
    };
    let deadline = match config.meeting.participant_deadline_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let orchestrator = MeetingOrchestrator::new(
        gateway,
        toolkit,
        Arc::new(store),
        observer,
        deadline,
    );

    let repo_root = cli.repo_root.display().to_string();
    let report = if let Some(id) = &cli.resume {
        info!(meeting_id = %id, "resuming meeting");
        orchestrator
            .resume(&MeetingId::from_string(id.clone()), &participants, &repo_root)
            .await?
    } else {
        let agenda = match cli.agenda {
            Some(a) => a,
            None => bail!("an agenda is required (or use --resume / --list-sessions)"),
        };
        orchestrator
            .run(RunMeetingInput {
                agenda,
                context: cli.context,
                participants,
                max_rounds: cli.max_rounds.unwrap_or(config.meeting.max_rounds),
                repo_root,
            })
            .await?
    };

    print_report(&report, cli.output)?;
    Ok(())
}

/// The chair's backend: configured explicitly, or the first
/// participant's backend doing double duty.
fn chair_config(config: &ConclaveConfig) -> BackendConfig {
    config.chair.clone().unwrap_or_else(|| {
        let mut chair = config.participants[0].clone();
        chair.id = "chair".to_string();
        chair
    })
}

fn list_sessions(store: &FsSessionStore) -> Result<()> {
    use conclave_application::SessionStorePort;

    let summaries = store.list_meetings()?;
    if summaries.is_empty() {
        println!("No persisted meetings.");
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  [{}]  {} round(s)  {}",
            summary.meeting_id, summary.status, summary.total_rounds, summary.agenda
        );
    }
    Ok(())
}

fn print_report(report: &MeetingReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Synthesis => println!("{}", report.synthesis.report),
        OutputFormat::Full => {
            for round in &report.rounds {
                println!("=== Round {} ===", round.index + 1);
                println!("Question: {}", round.question);
                println!();
                for outcome in &round.outcomes {
                    match outcome.text() {
                        Some(text) => println!("--- {} ---\n{text}\n", outcome.participant),
                        None => {
                            let detail = outcome
                                .failure()
                                .map(|f| f.to_string())
                                .unwrap_or_else(|| "unknown failure".to_string());
                            println!("--- {} (FAILED: {detail}) ---\n", outcome.participant);
                        }
                    }
                }
            }
            println!("=== Synthesis ===");
            println!("{}", report.synthesis.report);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "meeting_id": report.meeting_id,
                "rounds": report.rounds,
                "synthesis": report.synthesis,
                "elapsed_ms": report.elapsed_ms,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
