//! HTTP collaborators: the aviationstack provider and the flight-search
//! endpoint.

pub mod aviationstack;
pub mod flight_api;

pub use aviationstack::{AviationStackClient, ProviderError};
pub use flight_api::{
    AviationStackFetcher, FetchError, FetchResponse, FlightApiClient, FlightFetcher, SearchRequest,
};
