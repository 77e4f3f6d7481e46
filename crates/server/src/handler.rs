//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`].

use std::sync::Arc;

use clubwatch_client::FetchClient;
use clubwatch_core::{AppConfig, CacheDb};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::cache_status::{CacheStatusParams, cache_status_impl};
use crate::tools::refresh_match::{RefreshMatchParams, refresh_match_impl};

/// Shared state behind every tool call.
pub struct AppState {
    pub config: AppConfig,
    pub db: CacheDb,
    pub fetcher: FetchClient,
}

/// The MCP server handler for clubwatch.
#[derive(Clone)]
pub struct ClubwatchServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ClubwatchServer {
    pub fn new(config: AppConfig, db: CacheDb, fetcher: FetchClient) -> Self {
        Self { state: Arc::new(AppState { config, db, fetcher }), tool_router: Self::tool_router() }
    }

    /// Refresh both clubs of a fixture.
    ///
    /// Only categories whose content changed or whose TTL elapsed are re-extracted and stored.
    #[tool(
        description = "Refresh cached data for both clubs of a match. Returns a per-club, per-category report; unchanged categories are skipped."
    )]
    async fn refresh_match(&self, params: Parameters<RefreshMatchParams>) -> Result<CallToolResult, McpError> {
        refresh_match_impl(&self.state, params.0).await
    }

    #[tool(description = "Show the cache records and persisted fields stored for a club.")]
    async fn cache_status(&self, params: Parameters<CacheStatusParams>) -> Result<CallToolResult, McpError> {
        cache_status_impl(&self.state, params.0).await
    }
}

impl ServerHandler for ClubwatchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "clubwatch".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
