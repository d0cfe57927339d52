//! Reference-data tools.

mod airports;

pub use airports::{SearchAirportsParams, SearchAirportsTool};
