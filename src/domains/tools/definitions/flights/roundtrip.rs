//! Round-trip flight offer search tool.
//!
//! Same upstream endpoint as `offers.rs`, but this variant makes
//! `returnDate` a required parameter. The dispatcher reads the required set
//! from each tool's own schema, so the two variants validate differently.

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

/// Parameters for the round-trip flight offer search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRoundtripFlightOffersParams {
    #[schemars(description = "IATA code of the departure city/airport (e.g. JFK)")]
    pub origin_location_code: String,

    #[schemars(description = "IATA code of the destination city/airport (e.g. LAX)")]
    pub destination_location_code: String,

    #[schemars(description = "Outbound date in ISO 8601 format (YYYY-MM-DD)")]
    pub departure_date: String,

    /// Required here, unlike the one-way variant.
    #[schemars(description = "Return date in ISO 8601 format (YYYY-MM-DD)")]
    pub return_date: String,

    #[schemars(description = "Number of adult travellers (default: 1)")]
    #[serde(default = "default_adults")]
    pub adults: u32,

    #[schemars(description = "Travel class: ECONOMY, PREMIUM_ECONOMY, BUSINESS or FIRST")]
    pub travel_class: Option<String>,

    #[schemars(description = "Maximum number of flight offers to return (default: 10)")]
    #[serde(default = "default_max")]
    pub max: u32,
}

/// Round-trip flight offer search tool implementation.
#[derive(Clone)]
pub struct SearchRoundtripFlightOffersTool {
    client: Arc<AmadeusClient>,
}

impl SearchRoundtripFlightOffersTool {
    pub const NAME: &'static str = "search_roundtrip_flight_offers";

    pub const DESCRIPTION: &'static str = "Search for round-trip flight offers between two \
        airports or cities. Both the outbound and the return date are required. Returns priced \
        itineraries covering both legs.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    /// Factory for the catalog registry.
    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchRoundtripFlightOffersTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchRoundtripFlightOffersParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchRoundtripFlightOffersParams =
            serde_json::from_value(Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!(
            "Searching round-trip offers {} <-> {} ({} / {})",
            params.origin_location_code,
            params.destination_location_code,
            params.departure_date,
            params.return_date
        );

        let mut query = vec![
            ("originLocationCode", params.origin_location_code),
            ("destinationLocationCode", params.destination_location_code),
            ("departureDate", params.departure_date),
            ("returnDate", params.return_date),
            ("adults", params.adults.to_string()),
            ("max", params.max.to_string()),
        ];
        push_opt(&mut query, "travelClass", params.travel_class);

        let body = self.client.get("/v2/shopping/flight-offers", &query).await?;
        Ok(body)
    }
}
