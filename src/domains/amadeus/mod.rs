//! Amadeus API domain.
//!
//! Shared infrastructure for calling the Amadeus Self-Service REST APIs:
//! OAuth2 token management and a thin JSON GET client. The tool definitions
//! in `domains/tools/definitions/` are the only consumers.

mod client;
mod error;

pub use client::AmadeusClient;
pub use error::AmadeusError;
