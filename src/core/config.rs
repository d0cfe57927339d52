//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the Amadeus API credentials.
///
/// Each tool family defines its own expected environment variables; the core
/// treats these values as opaque. Credentials are optional at startup — the
/// catalog still loads without them, and API calls fail at dispatch time
/// with an authentication error instead.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Amadeus API client id (`AMADEUS_CLIENT_ID`).
    pub amadeus_client_id: Option<String>,

    /// Amadeus API client secret (`AMADEUS_CLIENT_SECRET`).
    pub amadeus_client_secret: Option<String>,

    /// Base URL of the Amadeus API (`AMADEUS_BASE_URL`).
    pub amadeus_base_url: String,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("amadeus_client_id", &self.amadeus_client_id)
            .field(
                "amadeus_client_secret",
                &self.amadeus_client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("amadeus_base_url", &self.amadeus_base_url)
            .finish()
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            amadeus_client_id: None,
            amadeus_client_secret: None,
            // Amadeus sandbox environment
            amadeus_base_url: "https://test.api.amadeus.com".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "travel-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server-level variables are prefixed with `MCP_` (for example
    /// `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`). Tool-family credentials use
    /// their own prefix (`AMADEUS_*`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Load Amadeus credentials
        if let Ok(client_id) = std::env::var("AMADEUS_CLIENT_ID") {
            config.credentials.amadeus_client_id = Some(client_id);
        }
        if let Ok(client_secret) = std::env::var("AMADEUS_CLIENT_SECRET") {
            config.credentials.amadeus_client_secret = Some(client_secret);
        }
        if let Ok(base_url) = std::env::var("AMADEUS_BASE_URL") {
            config.credentials.amadeus_base_url = base_url;
        }

        if config.credentials.amadeus_client_id.is_some()
            && config.credentials.amadeus_client_secret.is_some()
        {
            info!("Amadeus credentials loaded from environment");
        } else {
            warn!(
                "AMADEUS_CLIENT_ID / AMADEUS_CLIENT_SECRET not set - tool calls \
                 will fail with an authentication error until they are provided"
            );
        }

        config
    }
}
