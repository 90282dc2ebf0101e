//! Tool executor port
//!
//! How the application layer runs evidence tools. The production
//! implementation is the confined evidence toolkit in the
//! infrastructure layer; tests substitute mocks.

use async_trait::async_trait;
use conclave_domain::{ToolCall, ToolDefinition, ToolResult};

/// Port for executing read-only evidence tools.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// The tool vocabulary offered to participants.
    fn tool_definitions(&self) -> &[ToolDefinition];

    /// Check whether a tool is known.
    fn has_tool(&self, name: &str) -> bool {
        self.tool_definitions().iter().any(|t| t.name == name)
    }

    /// Execute one call. Tool-level failures come back as failed
    /// [`ToolResult`]s, never as panics or transport errors.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
