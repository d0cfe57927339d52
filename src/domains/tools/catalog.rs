//! Tool catalog - the trait, the loader, and the wire-shape transformer.
//!
//! The catalog is the single source of truth for all available tools. It is
//! built once at startup from the fixed factory registry in
//! `definitions/mod.rs` and shared read-only by every transport session.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::error::ToolError;
use crate::domains::amadeus::AmadeusClient;

/// A named, schema-described callable performing one external-API operation.
///
/// Implementations are immutable after construction and live for the process
/// lifetime; the catalog never mutates or removes them at runtime.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier.
    fn name(&self) -> &'static str;

    /// Human-readable description shown to clients.
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's input: an object schema with `properties`
    /// and an ordered `required` array.
    fn input_schema(&self) -> Arc<JsonObject>;

    /// Execute the tool with the full argument map.
    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError>;
}

/// Factory contract for catalog entries.
///
/// The registry of factories in `definitions/mod.rs` is the fixed, enumerable
/// plugin list this server loads at startup.
pub type ToolFactory = fn(&Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError>;

/// Errors that can occur while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A single tool failed to construct. Non-fatal: the loader logs it and
    /// continues with a partial catalog.
    #[error("Tool construction failed: {0}")]
    Construction(String),

    /// Nothing could be loaded at all. Fatal at startup.
    #[error("No tools could be loaded into the catalog")]
    NoTools,
}

impl CatalogError {
    /// Create a construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }
}

/// Wire-exposed shape of a catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct WireTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl WireTool {
    /// Convert to the rmcp tool model for the STDIO transport.
    pub fn into_rmcp_tool(self) -> rmcp::model::Tool {
        let schema = match self.input_schema {
            Value::Object(map) => map,
            _ => JsonObject::default(),
        };
        rmcp::model::Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: Arc::new(schema),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// The ordered, read-only set of tools known to the running process.
pub struct ToolCatalog {
    tools: Vec<Box<dyn Tool>>,
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ToolCatalog {
    /// Build the catalog from the default factory registry.
    pub fn build(client: &Arc<AmadeusClient>) -> Result<Self, CatalogError> {
        Self::from_factories(&super::definitions::default_factories(), client)
    }

    /// Build the catalog from an explicit factory list.
    ///
    /// A factory that fails is logged and skipped so one broken tool cannot
    /// take down the server; the result is a partial catalog. Only an empty
    /// result is an error.
    pub fn from_factories(
        factories: &[ToolFactory],
        client: &Arc<AmadeusClient>,
    ) -> Result<Self, CatalogError> {
        let mut loaded: Vec<Box<dyn Tool>> = Vec::with_capacity(factories.len());
        for factory in factories {
            match factory(client) {
                Ok(tool) => loaded.push(tool),
                Err(e) => warn!("Skipping tool that failed to load: {}", e),
            }
        }
        Self::from_tools(loaded)
    }

    /// Build the catalog directly from constructed tools.
    ///
    /// Duplicate names are resolved at load time: the first entry wins and
    /// later duplicates are logged and skipped, so `resolve` and the exposed
    /// list always agree.
    pub fn from_tools(tools: Vec<Box<dyn Tool>>) -> Result<Self, CatalogError> {
        let mut catalog: Vec<Box<dyn Tool>> = Vec::with_capacity(tools.len());
        let mut seen = HashSet::new();

        for tool in tools {
            if !seen.insert(tool.name()) {
                warn!(
                    "Duplicate tool name '{}' - keeping the first entry, skipping this one",
                    tool.name()
                );
                continue;
            }
            catalog.push(tool);
        }

        if catalog.is_empty() {
            return Err(CatalogError::NoTools);
        }

        Ok(Self { tools: catalog })
    }

    /// Resolve a tool by exact, case-sensitive name.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Number of loaded tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names of all loaded tools, in catalog order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Transform the catalog into its wire-exposed shape.
    ///
    /// Pure and recomputed on every call. Entries whose schema is not an
    /// object schema are dropped from the exposed list without raising - they
    /// remain resolvable by name in the call path.
    pub fn wire_tools(&self) -> Vec<WireTool> {
        self.tools
            .iter()
            .filter_map(|tool| {
                let schema = tool.input_schema();
                if schema.get("type").and_then(Value::as_str) != Some("object") {
                    debug!(
                        "Tool '{}' has a malformed input schema; excluding it from the tool list",
                        tool.name()
                    );
                    return None;
                }
                Some(WireTool {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    input_schema: Value::Object((*schema).clone()),
                })
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::config::CredentialsConfig;

    fn test_client() -> Arc<AmadeusClient> {
        Arc::new(AmadeusClient::new(CredentialsConfig::default()).unwrap())
    }

    fn ok_factory(_: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        let (tool, _) = StubTool::ok("factory_tool", &[]);
        Ok(tool)
    }

    fn failing_factory(_: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Err(CatalogError::construction("deliberately broken"))
    }

    #[test]
    fn test_default_catalog_loads_all_tools() {
        let catalog = ToolCatalog::build(&test_client()).unwrap();
        assert_eq!(catalog.len(), 8);

        let names = catalog.names();
        assert!(names.contains(&"search_flight_offers"));
        assert!(names.contains(&"search_roundtrip_flight_offers"));
        assert!(names.contains(&"search_cheapest_flight_dates"));
        assert!(names.contains(&"flight_price_analysis"));
        assert!(names.contains(&"search_airport_destinations"));
        assert!(names.contains(&"search_airports"));
        assert!(names.contains(&"search_hotels_by_city"));
        assert!(names.contains(&"search_hotel_offers"));
    }

    #[test]
    fn test_default_catalog_has_unique_names() {
        let catalog = ToolCatalog::build(&test_client()).unwrap();
        let names = catalog.names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_resolve_is_exact_and_case_sensitive() {
        let catalog = ToolCatalog::build(&test_client()).unwrap();
        assert!(catalog.resolve("search_flight_offers").is_some());
        assert!(catalog.resolve("Search_Flight_Offers").is_none());
        assert!(catalog.resolve("search_flight").is_none());
    }

    #[test]
    fn test_broken_factory_yields_partial_catalog() {
        let factories: Vec<ToolFactory> = vec![ok_factory, failing_factory];
        let catalog = ToolCatalog::from_factories(&factories, &test_client()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.resolve("factory_tool").is_some());
    }

    #[test]
    fn test_all_factories_broken_is_fatal() {
        let factories: Vec<ToolFactory> = vec![failing_factory, failing_factory];
        let err = ToolCatalog::from_factories(&factories, &test_client()).unwrap_err();
        assert!(matches!(err, CatalogError::NoTools));
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let (first, first_calls) = StubTool::ok("dup", &[]);
        let (second, second_calls) = StubTool::ok("dup", &["marker"]);
        let catalog = ToolCatalog::from_tools(vec![first, second]).unwrap();

        assert_eq!(catalog.len(), 1);
        // The surviving entry is the first one (no required params).
        let resolved = catalog.resolve("dup").unwrap();
        assert!(resolved.input_schema().get("required").unwrap().as_array().unwrap().is_empty());

        tokio_test::block_on(resolved.invoke(JsonObject::default())).unwrap();
        assert_eq!(first_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wire_tools_match_catalog() {
        let catalog = ToolCatalog::build(&test_client()).unwrap();
        let wire = catalog.wire_tools();
        assert_eq!(wire.len(), catalog.len());
        for tool in &wire {
            assert_eq!(tool.input_schema["type"], "object");
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_malformed_schema_dropped_from_list_but_resolvable() {
        let (good, _) = StubTool::ok("good_tool", &[]);
        let catalog =
            ToolCatalog::from_tools(vec![good, Box::new(MalformedSchemaTool)]).unwrap();

        // Excluded from the exposed list...
        let wire = catalog.wire_tools();
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].name, "good_tool");

        // ...but still resolvable by exact name in the call path.
        assert!(catalog.resolve("malformed_schema_tool").is_some());
    }

    #[test]
    fn test_wire_tool_converts_to_rmcp_model() {
        let catalog = ToolCatalog::build(&test_client()).unwrap();
        let tool = catalog.wire_tools().remove(0).into_rmcp_tool();
        assert!(tool.description.is_some());
        assert!(tool.input_schema.contains_key("properties"));
    }
}
