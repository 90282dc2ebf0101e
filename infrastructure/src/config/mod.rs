//! Configuration: participants, chair, and meeting defaults.
//!
//! Sources, highest priority first: `CONCLAVE_` environment variables,
//! an explicit `--config` file, `./conclave.toml` in the working
//! directory, a global `~/.config/conclave/config.toml`, built-in
//! defaults.

use conclave_domain::BackendKind;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One configured model backend (a participant or the chair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Short analyst name used in the transcript ("gpt", "claude").
    pub id: String,
    /// Wire dialect: "openai" or "anthropic".
    pub backend: String,
    /// Model identifier sent to the backend.
    pub model: String,
    /// API base URL, e.g. "https://api.openai.com/v1".
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never lives in the config file.
    pub api_key_env: String,
}

impl BackendConfig {
    pub fn backend_kind(&self) -> Result<BackendKind, String> {
        self.backend.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    /// Hard bound on deliberation rounds.
    pub max_rounds: u32,
    /// Per-participant wall-clock deadline per turn, in seconds.
    /// Zero disables the deadline.
    pub participant_deadline_secs: u64,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            participant_deadline_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConclaveConfig {
    pub participants: Vec<BackendConfig>,
    pub chair: Option<BackendConfig>,
    pub meeting: MeetingConfig,
    /// Session store base directory; defaults to `~/.conclave/sessions`.
    pub session_dir: Option<PathBuf>,
}

impl Default for ConclaveConfig {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            chair: None,
            meeting: MeetingConfig::default(),
            session_dir: None,
        }
    }
}

impl ConclaveConfig {
    /// Load configuration from all sources in priority order.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                figment = figment.merge(Toml::file(&global));
            }
        }
        let project = PathBuf::from("conclave.toml");
        if project.exists() {
            figment = figment.merge(Toml::file(&project));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("CONCLAVE_").split("__"));

        figment.extract().map_err(Box::new)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("conclave").join("config.toml"))
    }

    /// Session base directory, resolved against the home dir when not
    /// configured explicitly.
    pub fn resolved_session_dir(&self) -> PathBuf {
        if let Some(dir) = &self.session_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".conclave")
            .join("sessions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ConclaveConfig::default();
        assert!(config.participants.is_empty());
        assert_eq!(config.meeting.max_rounds, 3);
        assert_eq!(config.meeting.participant_deadline_secs, 300);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[meeting]
max_rounds = 5

[[participants]]
id = "gpt"
backend = "openai"
model = "gpt-4.1"
base_url = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"
"#,
        )
        .unwrap();

        let config = ConclaveConfig::load(Some(&path)).unwrap();
        assert_eq!(config.meeting.max_rounds, 5);
        assert_eq!(config.participants.len(), 1);
        assert_eq!(config.participants[0].id, "gpt");
        assert_eq!(
            config.participants[0].backend_kind().unwrap(),
            BackendKind::OpenAi
        );
    }

    #[test]
    fn session_dir_falls_back_to_home() {
        let config = ConclaveConfig::default();
        let dir = config.resolved_session_dir();
        assert!(dir.ends_with(".conclave/sessions") || dir.ends_with("sessions"));
    }
}
