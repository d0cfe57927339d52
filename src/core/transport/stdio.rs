//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP - the default and recommended
//! mode. Exactly one protocol server and one transport exist for the process
//! lifetime; an interrupt signal shuts the server down before exit.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport.
    ///
    /// Binds the server to stdin/stdout before any input is read, then waits
    /// for either the peer to close the stream or an interrupt signal.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        tokio::select! {
            result = service.waiting() => {
                result.map_err(|e| TransportError::ServiceError(e.to_string()))?;
                info!("STDIO transport finished");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down STDIO transport");
            }
        }

        Ok(())
    }
}
