//! Hotel offer search tool.
//!
//! Wraps `GET /v3/shopping/hotel-offers`: priced room offers for one or
//! more hotel ids.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::super::common::{default_adults, push_opt};
use crate::domains::amadeus::AmadeusClient;
use crate::domains::tools::{CatalogError, Tool, ToolError};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHotelOffersParams {
    #[schemars(description = "Comma-separated Amadeus hotel ids (from search_hotels_by_city)")]
    pub hotel_ids: String,

    #[schemars(description = "Number of adult guests per room (default: 1)")]
    #[serde(default = "default_adults")]
    pub adults: u32,

    #[schemars(description = "Check-in date in ISO 8601 format (YYYY-MM-DD)")]
    pub check_in_date: Option<String>,

    #[schemars(description = "Check-out date in ISO 8601 format (YYYY-MM-DD)")]
    pub check_out_date: Option<String>,

    #[schemars(description = "Number of rooms requested")]
    pub room_quantity: Option<u32>,

    #[schemars(description = "ISO 4217 currency code for the offers (e.g. EUR)")]
    pub currency: Option<String>,
}

/// Hotel offer search tool implementation.
#[derive(Clone)]
pub struct SearchHotelOffersTool {
    client: Arc<AmadeusClient>,
}

impl SearchHotelOffersTool {
    pub const NAME: &'static str = "search_hotel_offers";

    pub const DESCRIPTION: &'static str = "Search bookable room offers for one or more hotels. \
        Takes hotel ids from search_hotels_by_city plus optional stay dates and returns priced \
        offers per hotel.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchHotelOffersTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchHotelOffersParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchHotelOffersParams = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!("Searching hotel offers for ids: {}", params.hotel_ids);

        let mut query = vec![
            ("hotelIds", params.hotel_ids),
            ("adults", params.adults.to_string()),
        ];
        push_opt(&mut query, "checkInDate", params.check_in_date);
        push_opt(&mut query, "checkOutDate", params.check_out_date);
        push_opt(&mut query, "roomQuantity", params.room_quantity);
        push_opt(&mut query, "currency", params.currency);

        let body = self.client.get("/v3/shopping/hotel-offers", &query).await?;
        Ok(body)
    }
}
