//! Lifecycle of a flight search session.
//!
//! `Idle → Searching → {Success, Failure}`; a new search restarts at
//! `Searching` from any state. Every search gets a generation number and only
//! the latest generation may write its result, so a slow response to an older
//! search can never overwrite a newer one.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::entities::{
    DataSource, FilterState, FilterUpdate, Flight, FlightSearchResponse, SearchParams,
};
use super::evaluation::{chart_aggregate, price_stats, ChartRow, PriceStats};
use super::filters::{filter_flights, price_range, unique_airlines, PriceRange};

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Success,
    Failure,
}

/// Why a search produced no flights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The query was fine but the route has no flights.
    NoResults,
    /// A required credential is missing.
    Configuration,
    /// The search request itself was incomplete.
    InvalidRequest,
    /// The provider answered with an error body or non-JSON.
    Upstream,
    /// The request never produced a usable response.
    Transport,
    /// Non-success HTTP status without an error body.
    HttpStatus,
}

impl FailureKind {
    /// Fallback for error bodies that carry no explicit kind: "no flights" or
    /// "no results" wording means an empty route, anything else a real error.
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("no flights") || lowered.contains("no results") {
            FailureKind::NoResults
        } else {
            FailureKind::Upstream
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, FailureKind::NoResults)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchFailure {
    pub message: String,
    pub kind: FailureKind,
}

/// Issued by [`SearchState::begin_search`]; hands the result back to
/// [`SearchState::complete_search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What the network collaborator produced for one search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchResolution {
    Response {
        status: u16,
        body: FlightSearchResponse,
    },
    /// The fetch itself failed; carries the failure's message when it had one.
    TransportFailure(Option<String>),
}

#[derive(Clone, Debug, Default)]
pub struct SearchState {
    status: SearchStatus,
    flights: Vec<Flight>,
    filters: FilterState,
    failure: Option<SearchFailure>,
    has_searched: bool,
    search_params: Option<SearchParams>,
    data_source: Option<DataSource>,
    generation: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Searching
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        self.failure.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }

    /// True when the last search failed only because the route has no flights.
    pub fn is_no_results(&self) -> bool {
        self.failure
            .as_ref()
            .map(|f| f.kind.is_no_results())
            .unwrap_or(false)
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn search_params(&self) -> Option<&SearchParams> {
        self.search_params.as_ref()
    }

    pub fn data_source(&self) -> Option<DataSource> {
        self.data_source
    }

    pub fn filtered_flights(&self) -> Vec<Flight> {
        filter_flights(&self.flights, &self.filters)
    }

    pub fn available_airlines(&self) -> Vec<String> {
        unique_airlines(&self.flights)
    }

    pub fn price_range(&self) -> PriceRange {
        price_range(&self.flights)
    }

    /// Statistics over the flights currently passing the filters.
    pub fn price_stats(&self) -> PriceStats {
        price_stats(&self.filtered_flights())
    }

    pub fn chart_rows(&self) -> Vec<ChartRow> {
        chart_aggregate(&self.filtered_flights())
    }

    /// Enters `Searching` and supersedes any search still in flight.
    pub fn begin_search(&mut self, params: SearchParams) -> SearchTicket {
        self.generation += 1;
        info!(
            generation = self.generation,
            origin = %params.origin.code,
            destination = %params.destination.code,
            date = %params.departure_date_iso(),
            "search started"
        );
        self.status = SearchStatus::Searching;
        self.search_params = Some(params);
        self.failure = None;
        self.data_source = None;
        self.has_searched = true;
        SearchTicket {
            generation: self.generation,
        }
    }

    /// Applies a search result. Returns `false` and leaves the state untouched
    /// when the ticket belongs to a superseded search.
    pub fn complete_search(&mut self, ticket: SearchTicket, resolution: SearchResolution) -> bool {
        if ticket.generation != self.generation || self.status != SearchStatus::Searching {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded search result"
            );
            return false;
        }

        match resolution {
            SearchResolution::Response { status, body } => {
                if let Some(message) = body.error.filter(|m| !m.trim().is_empty()) {
                    let kind = body
                        .error_kind
                        .unwrap_or_else(|| FailureKind::from_message(&message));
                    self.fail(message, kind);
                } else if !(200..300).contains(&status) {
                    self.fail(format!("Search failed: {status}"), FailureKind::HttpStatus);
                } else {
                    self.succeed(body.flights, body.source);
                }
            }
            SearchResolution::TransportFailure(message) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UNEXPECTED_ERROR.to_string());
                self.fail(message, FailureKind::Transport);
            }
        }
        true
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.filters.apply(update);
    }

    /// Back to defaults with the ceiling at the highest current price.
    pub fn reset_filters(&mut self) {
        self.filters = FilterState::with_max_price(self.price_range().max);
    }

    /// Forgets the whole session. A search still in flight is superseded.
    pub fn clear(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    fn succeed(&mut self, flights: Vec<Flight>, source: Option<DataSource>) {
        info!(count = flights.len(), "search succeeded");
        self.status = SearchStatus::Success;
        self.flights = flights;
        self.data_source = source;
        self.reset_filters();
    }

    fn fail(&mut self, message: String, kind: FailureKind) {
        if kind.is_no_results() {
            info!(%message, "search returned no flights");
        } else {
            warn!(%message, ?kind, "search failed");
        }
        self.status = SearchStatus::Failure;
        self.flights.clear();
        self.failure = Some(SearchFailure { message, kind });
    }
}
