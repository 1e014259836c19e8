//! Tool executor adapter
//!
//! [`CatalogToolExecutor`] is the concrete [`ToolExecutorPort`]: it exposes
//! the two catalog-backed tools (`get_notice_details`, `search_notices`)
//! and executes exactly one attempt per call. Retry policy lives above the
//! port, in the application layer's tool runner.

use async_trait::async_trait;
use std::sync::Arc;
use tenderag_domain::{ToolDefinition, ToolError, ToolParameter, ToolRequest, ToolResult, ToolSpec};
use tenderag_application::ports::tool_executor::ToolExecutorPort;

use crate::catalog::NoticeCatalogClient;

/// Tool name constants
pub const GET_NOTICE_DETAILS: &str = "get_notice_details";
pub const SEARCH_NOTICES: &str = "search_notices";

/// Search results are capped regardless of what the model asks for.
const MAX_SEARCH_LIMIT: i64 = 20;
const DEFAULT_SEARCH_LIMIT: i64 = 5;

pub fn get_notice_details_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_NOTICE_DETAILS,
        "Fetch the full record of one procurement notice: buyer, budget, \
         deadlines, lots and award data. Use when the evidence passages lack \
         a field the question asks for.",
    )
    .with_parameter(ToolParameter::new(
        "notice_id",
        "Identifier of the notice (e.g. N-2024-001)",
        true,
    ))
}

pub fn search_notices_definition() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_NOTICES,
        "Keyword search over the notice catalog. Returns matching notice ids \
         and titles.",
    )
    .with_parameter(ToolParameter::new("query", "Search keywords", true))
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of results (default 5, max 20)", false)
            .with_type("number"),
    )
}

/// Executor backed by the notice catalog service.
pub struct CatalogToolExecutor {
    spec: ToolSpec,
    catalog: Arc<NoticeCatalogClient>,
}

impl CatalogToolExecutor {
    pub fn new(catalog: Arc<NoticeCatalogClient>) -> Self {
        Self {
            spec: ToolSpec::new()
                .register(get_notice_details_definition())
                .register(search_notices_definition()),
            catalog,
        }
    }

    async fn execute_get_notice_details(&self, request: &ToolRequest) -> ToolResult {
        let notice_id = match request.require_string("notice_id") {
            Ok(id) => id,
            Err(e) => return ToolResult::failure(GET_NOTICE_DETAILS, ToolError::invalid_argument(e)),
        };
        if notice_id.trim().is_empty() {
            return ToolResult::failure(
                GET_NOTICE_DETAILS,
                ToolError::invalid_argument("notice_id must not be empty"),
            );
        }

        match self.catalog.get_notice(notice_id).await {
            Ok(record) => ToolResult::success(GET_NOTICE_DETAILS, record.to_string()),
            Err(e) => ToolResult::failure(GET_NOTICE_DETAILS, e),
        }
    }

    async fn execute_search_notices(&self, request: &ToolRequest) -> ToolResult {
        let query = match request.require_string("query") {
            Ok(q) => q,
            Err(e) => return ToolResult::failure(SEARCH_NOTICES, ToolError::invalid_argument(e)),
        };
        let limit = request
            .get_i64("limit")
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT) as usize;

        match self.catalog.search_notices(query, limit).await {
            Ok(results) => ToolResult::success(SEARCH_NOTICES, results.to_string()),
            Err(e) => ToolResult::failure(SEARCH_NOTICES, e),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for CatalogToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, request: &ToolRequest) -> ToolResult {
        match request.tool_name.as_str() {
            GET_NOTICE_DETAILS => self.execute_get_notice_details(request).await,
            SEARCH_NOTICES => self.execute_search_notices(request).await,
            other => ToolResult::failure(other, ToolError::not_found(format!("tool '{other}'"))),
        }
    }
}
