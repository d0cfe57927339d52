//! Airport and city lookup tool.
//!
//! Wraps `GET /v1/reference-data/locations`: resolve a free-text keyword to
//! IATA location codes, which every other tool in the catalog expects.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::super::common::push_opt;
use crate::domains::amadeus::AmadeusClient;
use crate::domains::tools::{CatalogError, Tool, ToolError};

fn default_sub_type() -> String {
    "AIRPORT,CITY".to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchAirportsParams {
    #[schemars(description = "Search keyword: city name, airport name or partial IATA code")]
    pub keyword: String,

    #[schemars(description = "Location types to match: AIRPORT, CITY or AIRPORT,CITY (default)")]
    #[serde(default = "default_sub_type")]
    pub sub_type: String,

    #[schemars(description = "Maximum number of locations to return")]
    pub page_limit: Option<u32>,
}

/// Airport and city lookup tool implementation.
#[derive(Clone)]
pub struct SearchAirportsTool {
    client: Arc<AmadeusClient>,
}

impl SearchAirportsTool {
    pub const NAME: &'static str = "search_airports";

    pub const DESCRIPTION: &'static str = "Look up airports and cities by keyword and return \
        their IATA codes, names and geographic details. Use this to resolve location codes for \
        the flight and hotel tools.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchAirportsTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchAirportsParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchAirportsParams = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!("Looking up locations for keyword '{}'", params.keyword);

        let mut query = vec![
            ("keyword", params.keyword),
            ("subType", params.sub_type),
        ];
        push_opt(&mut query, "page[limit]", params.page_limit);

        let body = self
            .client
            .get("/v1/reference-data/locations", &query)
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_keyword_is_required() {
        let schema = cached_schema_for_type::<SearchAirportsParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["keyword"]);
    }

    #[test]
    fn test_sub_type_defaults_to_both() {
        let params: SearchAirportsParams =
            serde_json::from_str(r#"{"keyword": "new york"}"#).unwrap();
        assert_eq!(params.sub_type, "AIRPORT,CITY");
    }
}
