//! HTTP transport implementation.
//!
//! The multiplexed adapter: a long-lived `GET /sse` event stream per session
//! (server→client) paired with `POST /messages?sessionId=<id>`
//! (client→server). The two simplex flows together emulate one duplex MCP
//! channel. Informative REST endpoints are served alongside the protocol so
//! standard HTTP clients (curl, browsers, etc.) can inspect and call tools
//! directly.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{KeepAlive, Sse},
    },
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::rpc::JsonRpcRequest;
use super::session::{SessionManager, deliver};
use super::{HttpConfig, TransportError, TransportResult};
use crate::core::McpServer;
use crate::domains::tools::{missing_required, required_params};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance (catalog + identity).
    server: McpServer,
    /// Registry of live SSE sessions.
    sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(server: McpServer) -> Self {
        Self {
            server,
            sessions: Arc::new(SessionManager::new()),
        }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(AppState::new(server), self.config.enable_cors);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (HTTP + SSE)", addr);
        info!("  → SSE connect:  GET  /sse");
        info!("  → Messages:     POST /messages?sessionId=<id>");
        info!("  → Tool list:    GET  /api/tools");
        info!("  → Direct call:  POST /api/call-tool");
        info!("  → Health:       GET  /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Interrupt received, shutting down HTTP transport");
}

/// Build the axum router for the HTTP transport.
pub(crate) fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .route("/api/tools", get(list_tools))
        .route("/api/call-tool", post(call_tool))
        .route("/sse", get(sse_connect))
        .route("/messages", post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Travel MCP server is running"
    }))
}

/// Root handler - provides server identity and available endpoints.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP + SSE",
        "endpoints": {
            "health": "/health",
            "tools": "/api/tools",
            "callTool": "/api/call-tool",
            "sse": "/sse",
            "messages": "/messages?sessionId=<id>"
        },
        "tools": state.server.catalog().names()
    }))
}

/// Full tool list with descriptions and parameter schemas.
async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.catalog().wire_tools() }))
}

/// Direct tool invocation, bypassing the protocol envelope.
///
/// Unlike the protocol path, validation here is fail-slow: every missing
/// required parameter is reported at once, together with the tool's full
/// required list.
async fn call_tool(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let Some(tool_name) = body.get("toolName").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required field: toolName" })),
        )
            .into_response();
    };

    let arguments = body
        .get("arguments")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let catalog = state.server.catalog();
    let Some(tool) = catalog.resolve(tool_name) else {
        warn!("Unknown tool requested over REST: {}", tool_name);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Tool not found: {}", tool_name),
                "availableTools": catalog.names()
            })),
        )
            .into_response();
    };

    let schema = tool.input_schema();
    let missing = missing_required(&schema, &arguments);
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Missing required parameters: {}", missing.join(", ")),
                "missing": missing,
                "required": required_params(&schema)
            })),
        )
            .into_response();
    }

    match tool.invoke(arguments).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("Tool '{}' failed over REST: {}", tool_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Open one SSE session.
///
/// The session is registered before the response stream is returned; its
/// first event is the `endpoint` handshake carrying the message-post URL.
async fn sse_connect(
    State(state): State<AppState>,
) -> impl IntoResponse {
    let (session_id, stream) = SessionManager::open(&state.sessions, state.server.clone());
    info!(
        "SSE session {} connected ({} active)",
        session_id,
        state.sessions.len()
    );
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Deliver a posted JSON-RPC message to its session.
///
/// The response travels back over the session's event stream, not in this
/// HTTP response; the POST itself is only acknowledged.
async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing sessionId query parameter" })),
        )
            .into_response();
    };

    let Some(handle) = state.sessions.lookup(&session_id) else {
        warn!("Message posted to unknown session: {}", session_id);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("No active session for sessionId: {}", session_id) })),
        )
            .into_response();
    };

    let response = {
        let mut session = handle.session.lock().await;
        session.handle(request).await
    };

    if let Some(response) = response {
        match serde_json::to_string(&response) {
            Ok(payload) => deliver(&handle, &session_id, payload).await,
            Err(e) => error!("Failed to serialize response for {}: {}", session_id, e),
        }
    }

    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let server = McpServer::new(Config::default()).unwrap();
        build_router(AppState::new(server), false)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_root_lists_endpoints_and_tools() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "travel-mcp-server");
        assert!(body["endpoints"]["sse"].is_string());
        assert!(!body["tools"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_tools_exposes_schemas() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let tools = body["tools"].as_array().unwrap();
        assert!(!tools.is_empty());
        for tool in tools {
            assert!(tool["name"].is_string());
            assert!(tool["description"].is_string());
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_call_tool_without_name_is_bad_request() {
        let response = test_router()
            .oneshot(post_json("/api/call-tool", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing required field: toolName");
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_not_found_and_lists_tools() {
        let response = test_router()
            .oneshot(post_json(
                "/api/call-tool",
                json!({ "toolName": "no_such_tool", "arguments": {} }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("no_such_tool"));
        assert!(!body["availableTools"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_call_tool_reports_all_missing_params() {
        let response = test_router()
            .oneshot(post_json(
                "/api/call-tool",
                json!({
                    "toolName": "search_flight_offers",
                    "arguments": { "originLocationCode": "JFK" }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let missing: Vec<&str> = body["missing"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        // Fail-slow: both remaining required parameters reported at once.
        assert!(missing.contains(&"destinationLocationCode"));
        assert!(missing.contains(&"departureDate"));
        let required = body["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
    }

    #[tokio::test]
    async fn test_post_message_without_session_id_is_bad_request() {
        let rpc = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
        let response = test_router()
            .oneshot(post_json("/messages", rpc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("sessionId"));
    }

    #[tokio::test]
    async fn test_post_message_to_unknown_session_is_bad_request() {
        let rpc = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
        let response = test_router()
            .oneshot(post_json("/messages?sessionId=does-not-exist", rpc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
    }
}
