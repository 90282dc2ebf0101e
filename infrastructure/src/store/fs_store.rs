//! Filesystem session store.
//!
//! One directory per meeting under the configured base:
//!
//! ```text
//! <base>/<meeting-id>/
//!     metadata.json           # agenda, bounds, status, timing
//!     rounds/round_000.json   # question + participant outcomes
//!     rounds/verdict_000.json # chair verdict for that round
//!     synthesis.md            # final report
//!     events.jsonl            # append-only structured event log
//! ```
//!
//! Writes are whole-file replacements except `events.jsonl`, which is
//! append-only with one timestamped JSON object per line.

use chrono::SecondsFormat;
use conclave_application::{MeetingEvent, MeetingSummary, SessionStorePort, StoreError};
use conclave_domain::{Agenda, ChairVerdict, Meeting, MeetingId, Round, Synthesis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const METADATA_FILE: &str = "metadata.json";
const SYNTHESIS_FILE: &str = "synthesis.md";
const EVENTS_FILE: &str = "events.jsonl";
const ROUNDS_DIR: &str = "rounds";

#[derive(Debug, Serialize, Deserialize)]
struct MeetingMetadata {
    meeting_id: String,
    agenda: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    max_rounds: u32,
    created_at_ms: u64,
    status: String,
    #[serde(default)]
    elapsed_ms: u64,
}

pub struct FsSessionStore {
    base: PathBuf,
}

impl FsSessionStore {
    /// Open a store rooted at `base`, creating the directory if needed.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn meeting_dir(&self, id: &MeetingId) -> PathBuf {
        self.base.join(id.as_str())
    }

    /// Directory for `id`, erroring if the meeting was never created.
    fn existing_meeting_dir(&self, id: &MeetingId) -> Result<PathBuf, StoreError> {
        let dir = self.meeting_dir(id);
        if !dir.is_dir() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(dir)
    }

    fn round_file(dir: &Path, index: u32) -> PathBuf {
        dir.join(ROUNDS_DIR).join(format!("round_{index:03}.json"))
    }

    fn verdict_file(dir: &Path, index: u32) -> PathBuf {
        dir.join(ROUNDS_DIR).join(format!("verdict_{index:03}.json"))
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        fs::write(path, body)?;
        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, StoreError> {
        let body = fs::read_to_string(path)?;
        serde_json::from_str(&body)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))
    }

    fn read_metadata(&self, dir: &Path) -> Result<MeetingMetadata, StoreError> {
        Self::read_json(&dir.join(METADATA_FILE))
    }

    fn write_metadata(dir: &Path, metadata: &MeetingMetadata) -> Result<(), StoreError> {
        Self::write_json(&dir.join(METADATA_FILE), metadata)
    }

    /// Rounds present on disk, contiguous from 0.
    fn load_rounds(dir: &Path) -> Result<Vec<Round>, StoreError> {
        let mut rounds = Vec::new();
        loop {
            let index = rounds.len() as u32;
            let path = Self::round_file(dir, index);
            if !path.is_file() {
                break;
            }
            let mut round: Round = Self::read_json(&path)?;
            let verdict_path = Self::verdict_file(dir, index);
            if verdict_path.is_file() {
                let verdict: ChairVerdict = Self::read_json(&verdict_path)?;
                round.verdict = Some(verdict);
            }
            rounds.push(round);
        }
        Ok(rounds)
    }
}

impl SessionStorePort for FsSessionStore {
    fn create_meeting(&self, meeting: &Meeting) -> Result<(), StoreError> {
        let dir = self.meeting_dir(&meeting.id);
        fs::create_dir_all(dir.join(ROUNDS_DIR))?;
        Self::write_metadata(
            &dir,
            &MeetingMetadata {
                meeting_id: meeting.id.to_string(),
                agenda: meeting.agenda.content().to_string(),
                context: meeting.context.clone(),
                max_rounds: meeting.max_rounds,
                created_at_ms: meeting.created_at_ms,
                status: "running".to_string(),
                elapsed_ms: 0,
            },
        )
    }

    fn save_round(&self, id: &MeetingId, round: &Round) -> Result<(), StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        // The verdict travels in its own file; strip it so the round
        // file always reflects only the participant phase.
        let mut bare = round.clone();
        bare.verdict = None;
        Self::write_json(&Self::round_file(&dir, round.index), &bare)
    }

    fn save_verdict(&self, id: &MeetingId, verdict: &ChairVerdict) -> Result<(), StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        Self::write_json(&Self::verdict_file(&dir, verdict.round_index), verdict)
    }

    fn save_synthesis(&self, id: &MeetingId, synthesis: &Synthesis) -> Result<(), StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        fs::write(dir.join(SYNTHESIS_FILE), &synthesis.report)?;
        Ok(())
    }

    fn mark_finished(&self, id: &MeetingId, status: &str, elapsed_ms: u64) -> Result<(), StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        let mut metadata = self.read_metadata(&dir)?;
        metadata.status = status.to_string();
        metadata.elapsed_ms = elapsed_ms;
        Self::write_metadata(&dir, &metadata)
    }

    fn append_event(&self, id: &MeetingId, event: &MeetingEvent) -> Result<(), StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let payload = serde_json::to_value(event)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let record = match payload {
            Value::Object(mut map) => {
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => serde_json::json!({ "timestamp": timestamp, "data": other }),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(EVENTS_FILE))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn load_meeting(&self, id: &MeetingId) -> Result<Meeting, StoreError> {
        let dir = self.existing_meeting_dir(id)?;
        let metadata = self.read_metadata(&dir)?;
        let agenda = Agenda::new(metadata.agenda)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let rounds = Self::load_rounds(&dir)?;

        let synthesis_path = dir.join(SYNTHESIS_FILE);
        let synthesis = if synthesis_path.is_file() {
            let report = fs::read_to_string(&synthesis_path)?;
            Some(Synthesis::new(report, rounds.len() as u32))
        } else {
            None
        };

        Ok(Meeting {
            id: id.clone(),
            agenda,
            context: metadata.context,
            max_rounds: metadata.max_rounds,
            created_at_ms: metadata.created_at_ms,
            rounds,
            synthesis,
        })
    }

    fn list_meetings(&self) -> Result<Vec<MeetingSummary>, StoreError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir = entry.path();
            let metadata = match self.read_metadata(&dir) {
                Ok(m) => m,
                // Foreign directories in the base are skipped, not fatal.
                Err(_) => continue,
            };
            let total_rounds = Self::load_rounds(&dir)
                .map(|rounds| rounds.len() as u32)
                .unwrap_or(0);
            summaries.push(MeetingSummary {
                meeting_id: metadata.meeting_id,
                agenda: metadata.agenda,
                created_at_ms: metadata.created_at_ms,
                total_rounds,
                status: metadata.status,
            });
        }
        summaries.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(summaries)
    }
}
