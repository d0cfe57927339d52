//! Request dispatcher - the validate-then-invoke-then-respond sequence.
//!
//! `dispatch` is the single chokepoint every tool call goes through,
//! regardless of transport. Nothing escapes it except the three protocol
//! error kinds; a tool that fails can never crash the dispatch path.

use rmcp::ErrorData as McpError;
use rmcp::model::{ErrorCode, JsonObject};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use super::catalog::ToolCatalog;

/// Protocol-level dispatch failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No catalog entry matches the requested name.
    #[error("Tool not found: {0}")]
    MethodNotFound(String),

    /// A required parameter key is absent from the arguments.
    #[error("Missing required parameter: {0}")]
    InvalidParams(String),

    /// The tool implementation failed; only its message crosses the wire.
    #[error("Tool execution failed: {0}")]
    Internal(String),
}

impl DispatchError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Internal(_) => -32603,
        }
    }

    /// Convert into the rmcp error type for the STDIO transport.
    pub fn into_mcp_error(self) -> McpError {
        let code = match &self {
            Self::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => ErrorCode::INVALID_PARAMS,
            Self::Internal(_) => ErrorCode::INTERNAL_ERROR,
        };
        McpError::new(code, self.to_string(), None)
    }
}

/// Required parameter names declared by a tool schema, in schema order.
///
/// An absent or non-array `required` entry means no validation.
pub fn required_params(schema: &JsonObject) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|req| {
            req.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// All required parameter keys absent from the arguments, in schema order.
///
/// Presence is checked by key only - a null value satisfies the requirement.
pub fn missing_required(schema: &JsonObject, arguments: &JsonObject) -> Vec<String> {
    required_params(schema)
        .into_iter()
        .filter(|key| !arguments.contains_key(key))
        .collect()
}

/// Dispatch one tool call.
///
/// Resolves the name against the catalog (exact, case-sensitive), fails fast
/// on the first missing required key, invokes the implementation with the
/// full argument map (no timeout, no retry), and returns the pretty-printed
/// serialization of the result value. Every failure is logged here before it
/// is surfaced.
pub async fn dispatch(
    catalog: &ToolCatalog,
    name: &str,
    arguments: &JsonObject,
) -> Result<String, DispatchError> {
    let Some(tool) = catalog.resolve(name) else {
        warn!("Dispatch failed: unknown tool '{}'", name);
        return Err(DispatchError::MethodNotFound(name.to_string()));
    };

    let schema = tool.input_schema();
    if let Some(missing) = missing_required(&schema, arguments).into_iter().next() {
        warn!(
            "Dispatch failed: tool '{}' called without required parameter '{}'",
            name, missing
        );
        return Err(DispatchError::InvalidParams(missing));
    }

    match tool.invoke(arguments.clone()).await {
        Ok(value) => serde_json::to_string_pretty(&value).map_err(|e| {
            error!("Failed to serialize result of tool '{}': {}", name, e);
            DispatchError::Internal(e.to_string())
        }),
        Err(e) => {
            error!("Tool '{}' failed: {}", name, e);
            Err(DispatchError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::catalog::test_support::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_never_invokes_anything() {
        let (tool, calls) = StubTool::ok("known", &[]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        let err = dispatch(&catalog, "unknown", &JsonObject::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::MethodNotFound(_)));
        assert_eq!(err.code(), -32601);
        assert!(err.to_string().contains("unknown"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_required_param_fails_fast_with_name() {
        let (tool, calls) = StubTool::ok("needs_params", &["alpha", "beta", "gamma"]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        // alpha and gamma supplied, beta missing: the error names beta.
        let err = dispatch(
            &catalog,
            "needs_params",
            &args(json!({ "alpha": 1, "gamma": 3 })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), -32602);
        assert!(err.to_string().contains("beta"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_null_value_counts_as_present() {
        let (tool, calls) = StubTool::ok("nullable", &["key"]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        dispatch(&catalog, "nullable", &args(json!({ "key": null })))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_value_types_never_block_invocation() {
        let (tool, calls) = StubTool::ok("typed", &["count"]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        // "count" present as a string, array, whatever - dispatch proceeds.
        dispatch(&catalog, "typed", &args(json!({ "count": ["not", "a", "number"] })))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_required_set_skips_validation() {
        let (tool, calls) = StubTool::ok("no_required", &[]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        dispatch(&catalog, "no_required", &JsonObject::default())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_embeds_message_and_isolates_fault() {
        let failing = StubTool::failing("broken", "upstream exploded");
        let (ok_tool, _) = StubTool::ok("healthy", &[]);
        let catalog = ToolCatalog::from_tools(vec![failing, ok_tool]).unwrap();

        let err = dispatch(&catalog, "broken", &JsonObject::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32603);
        assert!(err.to_string().contains("upstream exploded"));

        // The dispatch path survives: an unrelated call still succeeds.
        dispatch(&catalog, "healthy", &JsonObject::default())
            .await
            .unwrap();
    }

    #[test]
    fn test_result_serialization_is_deterministic() {
        let (tool, _) = StubTool::ok("echo", &[]);
        let catalog = ToolCatalog::from_tools(vec![tool]).unwrap();

        let first = tokio_test::block_on(dispatch(&catalog, "echo", &JsonObject::default()))
            .unwrap();
        let second = tokio_test::block_on(dispatch(&catalog, "echo", &JsonObject::default()))
            .unwrap();

        assert_eq!(first, second);
        // Pretty-printed structural serialization.
        assert!(first.contains('\n'));
    }

    #[test]
    fn test_missing_required_reports_all_in_schema_order() {
        let schema = object_schema(&["one", "two", "three"]);
        let missing = missing_required(&schema, &args(json!({ "two": 2 })));
        assert_eq!(missing, vec!["one".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_required_params_absent_means_empty() {
        let schema = Arc::new(JsonObject::default());
        assert!(required_params(&schema).is_empty());
    }
}
