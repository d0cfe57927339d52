//! Hotel search tools.

mod by_city;
mod offers;

pub use by_city::{SearchHotelsByCityParams, SearchHotelsByCityTool};
pub use offers::{SearchHotelOffersParams, SearchHotelOffersTool};
