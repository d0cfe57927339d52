//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to
//! perform one external-API operation each.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//!   plus the fixed factory registry
//! - `catalog.rs` - The `Tool` trait, the catalog loader, and the wire-shape
//!   transformer
//! - `dispatch.rs` - The request dispatcher: resolve, validate, invoke,
//!   serialize
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `flights/my_tool.rs`)
//! 2. Define the params struct, `NAME`/`DESCRIPTION`, and the `Tool` impl
//! 3. Export it in `definitions/mod.rs`
//! 4. Add its factory to `default_factories()` in `definitions/mod.rs`
//!
//! **No need to modify the server or the transports!** The catalog is built
//! from the factory registry at startup.

pub mod catalog;
pub mod definitions;
mod dispatch;
mod error;

pub use catalog::{CatalogError, Tool, ToolCatalog, ToolFactory, WireTool};
pub use dispatch::{DispatchError, dispatch, missing_required, required_params};
pub use error::ToolError;
