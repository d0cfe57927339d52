//! Travel MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server that exposes a
//! catalog of travel-booking tools backed by the Amadeus Self-Service APIs.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling, the
//!   main server handler, and the transport layer (STDIO and HTTP+SSE)
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: the tool catalog, the request dispatcher, and the individual
//!     tool definitions
//!   - **amadeus**: the shared client for the upstream travel API
//!
//! # Example
//!
//! ```rust,no_run
//! use travel_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, McpServer, Result};
