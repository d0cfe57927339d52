//! Flight price analysis tool.
//!
//! Wraps `GET /v1/analytics/itinerary-price-metrics`: historical price
//! quartiles for a route on a given date, useful for judging whether a fare
//! is a good deal.

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
pub struct FlightPriceAnalysisParams {
    #[schemars(description = "IATA code of the origin airport (e.g. JFK)")]
    pub origin_iata_code: String,

    #[schemars(description = "IATA code of the destination airport (e.g. LAX)")]
    pub destination_iata_code: String,

    #[schemars(description = "Departure date in ISO 8601 format (YYYY-MM-DD)")]
    pub departure_date: String,

    #[schemars(description = "ISO 4217 currency code for the metrics (e.g. USD)")]
    pub currency_code: Option<String>,

    #[schemars(description = "If true, analyze one-way fares instead of round trips")]
    pub one_way: Option<bool>,
}

/// Flight price analysis tool implementation.
#[derive(Clone)]
pub struct FlightPriceAnalysisTool {
    client: Arc<AmadeusClient>,
}

impl FlightPriceAnalysisTool {
    pub const NAME: &'static str = "flight_price_analysis";

    pub const DESCRIPTION: &'static str = "Get historical price metrics for a flight route on \
        a given departure date: minimum, maximum and quartile prices, so a quoted fare can be \
        ranked against the market.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for FlightPriceAnalysisTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<FlightPriceAnalysisParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: FlightPriceAnalysisParams = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!(
            "Analyzing prices {} -> {} on {}",
            params.origin_iata_code, params.destination_iata_code, params.departure_date
        );

        let mut query = vec![
            ("originIataCode", params.origin_iata_code),
            ("destinationIataCode", params.destination_iata_code),
            ("departureDate", params.departure_date),
        ];
        push_opt(&mut query, "currencyCode", params.currency_code);
        push_opt(&mut query, "oneWay", params.one_way);

        let body = self
            .client
            .get("/v1/analytics/itinerary-price-metrics", &query)
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_set() {
        let schema = cached_schema_for_type::<FlightPriceAnalysisParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required.len(), 3);
        assert!(required.contains(&"originIataCode"));
        assert!(required.contains(&"destinationIataCode"));
        assert!(required.contains(&"departureDate"));
    }
}
