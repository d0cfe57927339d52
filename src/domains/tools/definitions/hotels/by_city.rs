//! Hotel list by city tool.
//!
//! Wraps `GET /v1/reference-data/locations/hotels/by-city`.

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
pub struct SearchHotelsByCityParams {
    #[schemars(description = "IATA city code to search in (e.g. PAR)")]
    pub city_code: String,

    #[schemars(description = "Search radius around the city center (default: 5)")]
    pub radius: Option<u32>,

    #[schemars(description = "Radius unit: KM or MILE")]
    pub radius_unit: Option<String>,

    #[schemars(description = "Comma-separated star ratings to filter on (e.g. 4,5)")]
    pub ratings: Option<String>,

    #[schemars(description = "Comma-separated amenity filters (e.g. SPA,WIFI)")]
    pub amenities: Option<String>,
}

/// Hotel list by city tool implementation.
#[derive(Clone)]
pub struct SearchHotelsByCityTool {
    client: Arc<AmadeusClient>,
}

impl SearchHotelsByCityTool {
    pub const NAME: &'static str = "search_hotels_by_city";

    pub const DESCRIPTION: &'static str = "List hotels in a city, identified by its IATA city \
        code, optionally filtered by radius, star rating and amenities. Returns hotel ids usable \
        with search_hotel_offers.";

    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: &Arc<AmadeusClient>) -> Result<Box<dyn Tool>, CatalogError> {
        Ok(Box::new(Self::new(client.clone())))
    }
}

#[async_trait]
impl Tool for SearchHotelsByCityTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Arc<JsonObject> {
        cached_schema_for_type::<SearchHotelsByCityParams>()
    }

    async fn invoke(&self, arguments: JsonObject) -> Result<Value, ToolError> {
        let params: SearchHotelsByCityParams = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!("Searching hotels in {}", params.city_code);

        let mut query = vec![("cityCode", params.city_code)];
        push_opt(&mut query, "radius", params.radius);
        push_opt(&mut query, "radiusUnit", params.radius_unit);
        push_opt(&mut query, "ratings", params.ratings);
        push_opt(&mut query, "amenities", params.amenities);

        let body = self
            .client
            .get("/v1/reference-data/locations/hotels/by-city", &query)
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_city_code_is_required() {
        let schema = cached_schema_for_type::<SearchHotelsByCityParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["cityCode"]);
    }

    #[test]
    fn test_optional_filters_deserialize() {
        let json = r#"{"cityCode": "PAR", "ratings": "4,5", "radiusUnit": "KM"}"#;
        let params: SearchHotelsByCityParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.ratings.as_deref(), Some("4,5"));
        assert!(params.amenities.is_none());
    }
}
