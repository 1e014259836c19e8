//! Tool domain value objects — immutable result and audit-trail types
//!
//! Every raw execution attempt produces a [`ToolResult`]; the retry layer
//! wraps 1..N attempts into a [`ToolInvocation`] whose [`InvocationOutcome`]
//! distinguishes a single clean failure from exhausted retries.
//!
//! Error codes in [`ToolError`] drive the retry strategy: a clearly-invalid
//! input (`NOT_FOUND`, `INVALID_ARGUMENT`) is non-retryable and returns
//! immediately, while transient codes (`EXECUTION_FAILED`, `TIMEOUT`,
//! `UNAVAILABLE`) are retried up to the configured cap.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error that occurred during a single tool execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "UNAVAILABLE")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
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

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("UNAVAILABLE", message)
    }

    /// Whether the failure is transient and worth retrying.
    ///
    /// A referenced entity that does not exist or a malformed argument will
    /// not get better on a second attempt; network hiccups and timeouts may.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.code.as_str(), "NOT_FOUND" | "INVALID_ARGUMENT")
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

/// Result of a single tool execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
        }
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
}

/// One recorded attempt within a logical tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAttempt {
    /// 1-based attempt number
    pub attempt_number: u32,
    /// Result of this attempt
    pub result: ToolResult,
}

/// Terminal outcome of a logical tool invocation.
///
/// `RetriesExhausted` is deliberately distinct from `Failed`: the reviewer
/// and the end user benefit from knowing persistence was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    Success,
    Failed,
    RetriesExhausted,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::Failed => "failed",
            InvocationOutcome::RetriesExhausted => "retries_exhausted",
        }
    }
}

/// A logical tool invocation: one request, 1..N attempts, one outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool invoked
    pub tool_name: String,
    /// Arguments as requested by the model
    pub arguments: HashMap<String, serde_json::Value>,
    /// Every attempt, in order, success or failure
    pub attempts: Vec<ToolAttempt>,
    /// Terminal outcome
    pub outcome: InvocationOutcome,
}

impl ToolInvocation {
    /// Payload of the final successful attempt, if any.
    pub fn payload(&self) -> Option<&str> {
        self.attempts
            .last()
            .filter(|a| a.result.is_success())
            .and_then(|a| a.result.output())
    }

    /// Error of the final attempt, if it failed.
    pub fn last_error(&self) -> Option<&ToolError> {
        self.attempts.last().and_then(|a| a.result.error())
    }

    /// Content fed back into the generation context.
    pub fn feedback_text(&self) -> String {
        match self.outcome {
            InvocationOutcome::Success => self.payload().unwrap_or("").to_string(),
            InvocationOutcome::Failed => format!(
                "Tool '{}' failed: {}",
                self.tool_name,
                self.last_error().map(|e| e.to_string()).unwrap_or_default()
            ),
            InvocationOutcome::RetriesExhausted => format!(
                "Tool '{}' failed after {} attempts (retries exhausted): {}",
                self.tool_name,
                self.attempts.len(),
                self.last_error().map(|e| e.to_string()).unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_retryability() {
        assert!(!ToolError::not_found("notice-1").is_retryable());
        assert!(!ToolError::invalid_argument("bad id").is_retryable());
        assert!(ToolError::execution_failed("io error").is_retryable());
        assert!(ToolError::timeout("fetch").is_retryable());
        assert!(ToolError::unavailable("connection refused").is_retryable());
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("get_notice_details", "{\"budget\": 100}");
        assert!(result.is_success());
        assert_eq!(result.output(), Some("{\"budget\": 100}"));
        assert!(result.error().is_none());
    }

    #[test]
    fn test_invocation_payload_and_feedback() {
        let invocation = ToolInvocation {
            tool_name: "get_notice_details".to_string(),
            arguments: HashMap::new(),
            attempts: vec![
                ToolAttempt {
                    attempt_number: 1,
                    result: ToolResult::failure(
                        "get_notice_details",
                        ToolError::unavailable("503"),
                    ),
                },
                ToolAttempt {
                    attempt_number: 2,
                    result: ToolResult::success("get_notice_details", "record"),
                },
            ],
            outcome: InvocationOutcome::Success,
        };

        assert_eq!(invocation.payload(), Some("record"));
        assert_eq!(invocation.feedback_text(), "record");
    }

    #[test]
    fn test_retries_exhausted_feedback_mentions_attempts() {
        let invocation = ToolInvocation {
            tool_name: "search_notices".to_string(),
            arguments: HashMap::new(),
            attempts: (1..=3)
                .map(|n| ToolAttempt {
                    attempt_number: n,
                    result: ToolResult::failure("search_notices", ToolError::timeout("search")),
                })
                .collect(),
            outcome: InvocationOutcome::RetriesExhausted,
        };

        assert!(invocation.payload().is_none());
        let feedback = invocation.feedback_text();
        assert!(feedback.contains("3 attempts"));
        assert!(feedback.contains("retries exhausted"));
    }
}
