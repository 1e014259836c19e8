//! Tool Runner
//!
//! Wraps [`ToolExecutorPort::execute`] with the retry policy: transient
//! failures (`EXECUTION_FAILED`, `TIMEOUT`, `UNAVAILABLE`) are retried up
//! to the configured cap, non-retryable codes (`NOT_FOUND`,
//! `INVALID_ARGUMENT`) return after exactly one attempt. Every attempt is
//! recorded in the returned [`ToolInvocation`]'s audit trail.

use crate::ports::tool_executor::ToolExecutorPort;
use std::sync::Arc;
use tenderag_domain::{
    InvocationOutcome, ToolAttempt, ToolError, ToolInvocation, ToolRequest, ToolResult,
};
use tracing::{debug, warn};

/// Executes one logical tool invocation with bounded retries.
pub struct ToolRunner {
    executor: Arc<dyn ToolExecutorPort>,
    /// Retries after the first failed attempt
    max_retries: u32,
}

impl ToolRunner {
    pub fn new(executor: Arc<dyn ToolExecutorPort>, max_retries: u32) -> Self {
        Self {
            executor,
            max_retries,
        }
    }

    /// Run a tool request to its terminal outcome. Never errors: failures
    /// are encoded in the invocation itself.
    pub async fn run(&self, request: &ToolRequest) -> ToolInvocation {
        if !self.executor.has_tool(&request.tool_name) {
            // A tool the model invented never reaches the executor.
            let result = ToolResult::failure(
                &request.tool_name,
                ToolError::not_found(format!("tool '{}'", request.tool_name)),
            );
            return ToolInvocation {
                tool_name: request.tool_name.clone(),
                arguments: request.arguments.clone(),
                attempts: vec![ToolAttempt {
                    attempt_number: 1,
                    result,
                }],
                outcome: InvocationOutcome::Failed,
            };
        }

        let mut attempts = Vec::new();
        let max_attempts = 1 + self.max_retries;

        loop {
            let attempt_number = attempts.len() as u32 + 1;
            let result = self.executor.execute(request).await;
            let succeeded = result.is_success();
            let retryable = result.error().map(ToolError::is_retryable).unwrap_or(false);

            attempts.push(ToolAttempt {
                attempt_number,
                result,
            });

            if succeeded {
                debug!(
                    "Tool '{}' succeeded on attempt {}",
                    request.tool_name, attempt_number
                );
                return ToolInvocation {
                    tool_name: request.tool_name.clone(),
                    arguments: request.arguments.clone(),
                    attempts,
                    outcome: InvocationOutcome::Success,
                };
            }

            if !retryable {
                debug!(
                    "Tool '{}' failed with a non-retryable error, not retrying",
                    request.tool_name
                );
                return ToolInvocation {
                    tool_name: request.tool_name.clone(),
                    arguments: request.arguments.clone(),
                    attempts,
                    outcome: InvocationOutcome::Failed,
                };
            }

            if attempt_number >= max_attempts {
                warn!(
                    "Tool '{}' exhausted {} attempts",
                    request.tool_name, attempt_number
                );
                return ToolInvocation {
                    tool_name: request.tool_name.clone(),
                    arguments: request.arguments.clone(),
                    attempts,
                    outcome: InvocationOutcome::RetriesExhausted,
                };
            }

            debug!(
                "Tool '{}' attempt {} failed with a transient error, retrying",
                request.tool_name, attempt_number
            );
        }
    }
}
