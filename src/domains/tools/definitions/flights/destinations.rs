//! Direct destinations tool.
//!
//! Wraps `GET /v1/airport/direct-destinations`: every destination served
//! non-stop from a given airport.

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

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchAirportDestinationsParams {
    #[schemars(description = "IATA code of the departure airport (e.g. BOS)")]
    pub departure_airport_code: String,

    #[schemars(description = "Maximum number of destinations to return")]
    pub max: Option<u32>,
}

/// Direct destinations tool implementation.
#[derive(Clone)]
pub struct SearchAirportDestinationsTool {
    client: Arc<AmadeusClient>,
}

impl SearchAirportDestinationsTool {
    pub const NAME: &'static str = "search_airport_destinations";

    pub const DESCRIPTION: &'static str =
        "List every destination served non-stop from a given airport.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchAirportDestinationsTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchAirportDestinationsParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchAirportDestinationsParams =
            serde_json::from_value(Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!(
            "Listing direct destinations from {}",
            params.departure_airport_code
        );

        let mut query = vec![("departureAirportCode", params.departure_airport_code)];
        push_opt(&mut query, "max", params.max);

        let body = self
            .client
            .get("/v1/airport/direct-destinations", &query)
            .await?;
        Ok(body)
    }
}
