//! Asynchronous client for the Amadeus Self-Service APIs.
//!
//! One instance is shared by every tool in the catalog. The client owns the
//! OAuth2 client-credentials flow: an access token is fetched lazily on the
//! first request and cached until shortly before its expiry.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::AmadeusError;
use crate::core::config::CredentialsConfig;

/// Tokens are refreshed this long before their reported expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// Shared Amadeus API client.
pub struct AmadeusClient {
    http: reqwest::Client,
    credentials: CredentialsConfig,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Response body of the OAuth2 token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl AmadeusClient {
    /// Create a new client with the given credentials.
    ///
    /// Missing credentials are not an error here: the catalog must load
    /// without them. Calls fail with [`AmadeusError::Auth`] at request time
    /// instead.
    pub fn new(credentials: CredentialsConfig) -> Result<Self, AmadeusError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("travel-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            credentials,
            token: RwLock::new(None),
        })
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.credentials.amadeus_base_url
    }

    /// Perform an authenticated GET against an API path.
    ///
    /// `path` is the versioned endpoint path (e.g.
    /// `/v2/shopping/flight-offers`); `query` the raw query parameters. The
    /// upstream JSON body is returned as-is on success.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, AmadeusError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.credentials.amadeus_base_url, path);

        debug!("GET {} ({} query params)", path, query.len());

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(AmadeusError::Api {
                status: status.as_u16(),
                message: extract_api_error(&body),
            });
        }

        Ok(response.json().await?)
    }

    /// Get a valid access token, fetching a fresh one if needed.
    async fn access_token(&self) -> Result<String, AmadeusError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(token) = slot.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<CachedToken, AmadeusError> {
        let (Some(client_id), Some(client_secret)) = (
            self.credentials.amadeus_client_id.as_deref(),
            self.credentials.amadeus_client_secret.as_deref(),
        ) else {
            return Err(AmadeusError::auth(
                "AMADEUS_CLIENT_ID and AMADEUS_CLIENT_SECRET must be set",
            ));
        };

        let url = format!(
            "{}/v1/security/oauth2/token",
            self.credentials.amadeus_base_url
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(AmadeusError::auth(format!(
                "token request rejected ({}): {}",
                status,
                extract_api_error(&body)
            )));
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = Utc::now()
            + Duration::seconds((token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0));

        info!("Obtained Amadeus access token (expires in {}s)", token.expires_in);

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// Pull a human-readable message out of an Amadeus error body.
///
/// Error bodies look like `{"errors": [{"detail": "...", "title": "..."}]}`;
/// anything else falls back to the serialized body.
fn extract_api_error(body: &Value) -> String {
    body.get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| {
            e.get("detail")
                .or_else(|| e.get("title"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
