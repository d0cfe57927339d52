//! Flight offer search tool.
//!
//! Wraps `GET /v2/shopping/flight-offers`, the Amadeus flight offers search.
//! Covers one-way trips by default; a return date may be supplied but is not
//! required (see `roundtrip.rs` for the variant that requires one).

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::super::common::{default_adults, default_max, push_opt};
use crate::domains::amadeus::AmadeusClient;
use crate::domains::tools::{CatalogError, Tool, ToolError};

/// Parameters for the flight offer search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFlightOffersParams {
    /// IATA code of the departure city or airport.
    #[schemars(description = "IATA code of the departure city/airport (e.g. JFK)")]
    pub origin_location_code: String,

    /// IATA code of the arrival city or airport.
    #[schemars(description = "IATA code of the destination city/airport (e.g. LAX)")]
    pub destination_location_code: String,

    /// Departure date in ISO 8601 format (YYYY-MM-DD).
    #[schemars(description = "Departure date in ISO 8601 format (YYYY-MM-DD)")]
    pub departure_date: String,

    /// Return date; omit for a one-way search.
    #[schemars(description = "Return date in ISO 8601 format; omit for one-way trips")]
    pub return_date: Option<String>,

    /// Number of adult travellers (default: 1).
    #[schemars(description = "Number of adult travellers (default: 1)")]
    #[serde(default = "default_adults")]
    pub adults: u32,

    /// Cabin class filter.
    #[schemars(description = "Travel class: ECONOMY, PREMIUM_ECONOMY, BUSINESS or FIRST")]
    pub travel_class: Option<String>,

    /// Restrict results to direct flights.
    #[schemars(description = "If true, only return flights without stops")]
    pub non_stop: Option<bool>,

    /// Maximum number of offers to return (default: 10).
    #[schemars(description = "Maximum number of flight offers to return (default: 10)")]
    #[serde(default = "default_max")]
    pub max: u32,
}

/// Flight offer search tool implementation.
#[derive(Clone)]
pub struct SearchFlightOffersTool {
    client: Arc<AmadeusClient>,
}

impl SearchFlightOffersTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_flight_offers";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search for flight offers between two airports or \
        cities on a given departure date. One-way by default; pass returnDate for a round trip. \
        Returns priced itineraries with segments, carriers and fare details.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    /// Factory for the catalog registry.
    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchFlightOffersTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchFlightOffersParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchFlightOffersParams =
            serde_json::from_value(Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!(
            "Searching flight offers {} -> {} on {}",
            params.origin_location_code, params.destination_location_code, params.departure_date
        );

        let mut query = vec![
            ("originLocationCode", params.origin_location_code),
            ("destinationLocationCode", params.destination_location_code),
            ("departureDate", params.departure_date),
            ("adults", params.adults.to_string()),
            ("max", params.max.to_string()),
        ];
        push_opt(&mut query, "returnDate", params.return_date);
        push_opt(&mut query, "travelClass", params.travel_class);
        push_opt(&mut query, "nonStop", params.non_stop);

        let body = self.client.get("/v2/shopping/flight-offers", &query).await?;
        Ok(body)
    }
}
