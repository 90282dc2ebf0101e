//! Infrastructure layer for conclave
//!
//! Concrete adapters behind the application ports: the read-only
//! evidence toolkit over a confined repository root, HTTP gateways for
//! OpenAI- and Anthropic-dialect backends, the filesystem session
//! store, and configuration loading.

pub mod adapters;
pub mod config;
pub mod providers;
pub mod store;
pub mod toolkit;

pub use config::{BackendConfig, ConclaveConfig, MeetingConfig};
pub use providers::HttpLlmGateway;
pub use store::FsSessionStore;
pub use toolkit::EvidenceToolkit;
