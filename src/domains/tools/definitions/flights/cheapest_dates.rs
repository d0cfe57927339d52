//! Cheapest flight dates tool.
//!
//! Wraps `GET /v1/shopping/flight-dates`: for a route, find the dates on
//! which flying is cheapest.

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
pub struct SearchCheapestFlightDatesParams {
    #[schemars(description = "IATA code of the origin city/airport (e.g. MAD)")]
    pub origin: String,

    #[schemars(description = "IATA code of the destination city/airport (e.g. MUC)")]
    pub destination: String,

    #[schemars(description = "Departure date or date range (YYYY-MM-DD or YYYY-MM-DD,YYYY-MM-DD)")]
    pub departure_date: Option<String>,

    #[schemars(description = "If true, search one-way fares only")]
    pub one_way: Option<bool>,

    #[schemars(description = "Trip duration in days or a range (e.g. 7 or 2,8)")]
    pub duration: Option<String>,

    #[schemars(description = "If true, only consider flights without stops")]
    pub non_stop: Option<bool>,
}

/// Cheapest flight dates tool implementation.
#[derive(Clone)]
pub struct SearchCheapestFlightDatesTool {
    client: Arc<AmadeusClient>,
}

impl SearchCheapestFlightDatesTool {
    pub const NAME: &'static str = "search_cheapest_flight_dates";

    pub const DESCRIPTION: &'static str = "Find the cheapest dates to fly a given route. \
        Returns one entry per departure date with the lowest available fare.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchCheapestFlightDatesTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchCheapestFlightDatesParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchCheapestFlightDatesParams =
            serde_json::from_value(Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!(
            "Searching cheapest dates {} -> {}",
            params.origin, params.destination
        );

        let mut query = vec![
            ("origin", params.origin),
            ("destination", params.destination),
        ];
        push_opt(&mut query, "departureDate", params.departure_date);
        push_opt(&mut query, "oneWay", params.one_way);
        push_opt(&mut query, "duration", params.duration);
        push_opt(&mut query, "nonStop", params.non_stop);

        let body = self.client.get("/v1/shopping/flight-dates", &query).await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_set() {
        let schema = cached_schema_for_type::<SearchCheapestFlightDatesParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required.len(), 2);
        assert!(required.contains(&"origin"));
        assert!(required.contains(&"destination"));
    }

    #[test]
    fn test_minimal_params_deserialize() {
        let params: SearchCheapestFlightDatesParams =
            serde_json::from_str(r#"{"origin": "MAD", "destination": "MUC"}"#).unwrap();
        assert!(params.departure_date.is_none());
        assert!(params.one_way.is_none());
    }
}
