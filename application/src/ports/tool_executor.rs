//! Tool Executor port
//!
//! Defines the interface for executing one raw tool attempt. Retry policy
//! lives above this port, in [`ToolRunner`](crate::use_cases::tool_runner::ToolRunner);
//! implementations report each failure once and never retry internally.

use async_trait::async_trait;
use tenderag_domain::{ToolDefinition, ToolRequest, ToolResult, ToolSpec};

/// Port for tool execution
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().has(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Execute one attempt of a tool request
    async fn execute(&self, request: &ToolRequest) -> ToolResult;
}
