//! Transport layer for the MCP server.
//!
//! This module provides the two transport implementations:
//! - **STDIO**: a single persistent duplex stream over stdin/stdout — one
//!   protocol server for the process lifetime (standard MCP mode).
//! - **HTTP**: a multiplexed channel — one SSE event stream per session plus
//!   a message-post endpoint, alongside informative REST endpoints.
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the MCP server handler.

mod config;
mod error;
mod service;

pub mod http;
pub mod rpc;
pub mod session;
pub mod stdio;

pub use config::{HttpConfig, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
