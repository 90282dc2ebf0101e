//! Tool result and error value objects
//!
//! Every toolkit operation produces a [`ToolResult`]; tool errors are
//! recovered locally into it and never abort a participant's turn on
//! their own.

use serde::{Deserialize, Serialize};

/// Error from a toolkit operation.
///
/// | Code | Meaning |
/// |------|---------|
/// | `INVALID_PATTERN` | glob pattern can produce no possible match |
/// | `INVALID_REF` | diff base ref failed the conservative charset check |
/// | `INVALID_ARGUMENT` | missing or undecodable call arguments |
/// | `NOT_FOUND` | path does not resolve to a regular file in the root |
/// | `ACCESS_DENIED` | confinement violation or denylisted path |
/// | `TOO_LARGE` | content exceeds a fixed size ceiling |
/// | `EXECUTION_FAILED` | underlying I/O or process failure |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::new(
            "INVALID_PATTERN",
            format!("Pattern can match nothing: {}", pattern.into()),
        )
    }

    pub fn invalid_ref(base: impl Into<String>) -> Self {
        Self::new("INVALID_REF", format!("Invalid base ref: {}", base.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Not a readable file: {}", path.into()))
    }

    pub fn access_denied(path: impl Into<String>) -> Self {
        Self::new("ACCESS_DENIED", format!("Access denied: {}", path.into()))
    }

    pub fn too_large(what: impl Into<String>) -> Self {
        Self::new("TOO_LARGE", format!("Size ceiling exceeded: {}", what.into()))
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of one tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Canonical tool name
    pub tool_name: String,
    /// Whether the execution succeeded
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured execution metadata, populated per tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// For searches: number of hits returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    /// For file operations: the path involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Set when output was cut at a fixed ceiling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Text to hand back to the backend: output on success, the
    /// rendered error otherwise.
    pub fn payload_text(&self) -> String {
        if self.success {
            self.output.clone().unwrap_or_default()
        } else {
            self.error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown tool error".to_string())
        }
    }
}
