//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tool catalog and dispatcher.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! The catalog is built once at startup from the factory registry in
//! `definitions/mod.rs`; `ServerHandler::list_tools` and
//! `ServerHandler::call_tool` below read it on every request.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::amadeus::AmadeusClient;
use crate::domains::tools::{ToolCatalog, dispatch};

/// Instructions string reported to clients during initialization.
pub const SERVER_INSTRUCTIONS: &str =
    "This server provides travel-booking tools backed by the Amadeus API: \
     flight offer search, flight price analysis, airport and hotel lookup.";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and routes tool
/// requests through the shared catalog. It is cheap to clone: the catalog and
/// configuration are behind `Arc`s, so every transport session shares the
/// same read-only catalog.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The immutable tool catalog, built once at startup.
    catalog: Arc<ToolCatalog>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Builds the Amadeus client and the tool catalog. Individual tools that
    /// fail to construct are skipped (the catalog is partial, never absent);
    /// an empty catalog is an error.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let config = Arc::new(config);

        let client = Arc::new(AmadeusClient::new(config.credentials.clone())?);
        let catalog = Arc::new(ToolCatalog::build(&client)?);

        Ok(Self { config, catalog })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared tool catalog.
    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        let tools = self
            .catalog
            .wire_tools()
            .into_iter()
            .map(|t| t.into_rmcp_tool())
            .collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        let arguments = request.arguments.unwrap_or_default();

        let text = dispatch(&self.catalog, &request.name, &arguments)
            .await
            .map_err(|e| e.into_mcp_error())?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_construction() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.name(), "travel-mcp-server");
        assert!(!server.catalog().is_empty());
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_clone_shares_catalog() {
        let server = McpServer::new(Config::default()).unwrap();
        let clone = server.clone();
        assert!(Arc::ptr_eq(server.catalog(), clone.catalog()));
    }
}
