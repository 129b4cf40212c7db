//! Flight search domain: entities, fare estimation, provider transform,
//! filtering, price summaries and the search lifecycle.

pub mod airports;
pub mod entities;
pub mod evaluation;
pub mod filters;
pub mod pricing;
pub mod search_state;
pub mod transform;

pub use airports::{airline_name, airport_label, popular_airports, search_airports};
pub use entities::{
    Airport, AirportInput, DataSource, FilterState, FilterUpdate, Flight, FlightSearchResponse,
    SearchParams, SearchParamsError, StopsBucket,
};
pub use evaluation::{
    chart_aggregate, chart_points, price_band, price_stats, ChartPoint, ChartRow, PriceBand,
    PriceStats,
};
pub use filters::{filter_flights, price_range, unique_airlines, PriceRange};
pub use pricing::PriceEstimator;
pub use search_state::{
    FailureKind, SearchFailure, SearchResolution, SearchState, SearchStatus, SearchTicket,
};
pub use transform::{transform_batch, transform_flight, RawFlightRecord};
