//! Flight search tools.

mod cheapest_dates;
mod destinations;
mod offers;
mod price_analysis;
mod roundtrip;

pub use cheapest_dates::{SearchCheapestFlightDatesParams, SearchCheapestFlightDatesTool};
pub use destinations::{SearchAirportDestinationsParams, SearchAirportDestinationsTool};
pub use offers::{SearchFlightOffersParams, SearchFlightOffersTool};
pub use price_analysis::{FlightPriceAnalysisParams, FlightPriceAnalysisTool};
pub use roundtrip::{SearchRoundtripFlightOffersParams, SearchRoundtripFlightOffersTool};
