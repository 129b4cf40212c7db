use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    domain::{
        entities::{FilterUpdate, SearchParams},
        search_state::{SearchResolution, SearchState, SearchStatus},
    },
    infra::{
        aviationstack::ProviderError,
        flight_api::{AviationStackFetcher, FetchError, FlightApiClient, FlightFetcher, SearchRequest},
    },
    util::config::Settings,
};

/// Drives one search session: the injected fetcher does the network work and
/// [`SearchState`] owns everything the presentation reads.
pub struct FlightSearch<F> {
    fetcher: F,
    state: SearchState,
}

impl<F: FlightFetcher> FlightSearch<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            state: SearchState::new(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs a search to completion and returns the resulting status. Never
    /// fails; errors end up in [`SearchState::failure`].
    pub async fn search(&mut self, params: SearchParams) -> SearchStatus {
        let request = SearchRequest::from(&params);
        let ticket = self.state.begin_search(params);
        let resolution = resolve(&self.fetcher, &request).await;
        self.state.complete_search(ticket, resolution);
        self.state.status()
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.state.update_filters(update);
    }

    pub fn reset_filters(&mut self) {
        self.state.reset_filters();
    }

    pub fn clear_search(&mut self) {
        self.state.clear();
    }
}

impl FlightSearch<FlightApiClient> {
    /// Searches through the configured flight-search endpoint.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Ok(Self::new(FlightApiClient::from_settings(settings)?))
    }
}

impl FlightSearch<AviationStackFetcher> {
    /// Searches the provider directly, without an intermediate endpoint.
    pub fn direct(settings: &Settings) -> Result<Self, ProviderError> {
        Ok(Self::new(AviationStackFetcher::from_settings(settings)?))
    }
}

/// Cloneable handle for callers that may start a new search while another is
/// still in flight. Only the newest search is allowed to write its result.
pub struct SearchHandle<F> {
    fetcher: Arc<F>,
    state: Arc<Mutex<SearchState>>,
}

impl<F> Clone for SearchHandle<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            state: Arc::clone(&self.state),
        }
    }
}

impl<F: FlightFetcher> SearchHandle<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(SearchState::new())),
        }
    }

    /// The state lock is released while the fetch is pending. Returns `false`
    /// when a later search or a clear superseded this one.
    pub async fn search(&self, params: SearchParams) -> bool {
        let request = SearchRequest::from(&params);
        let ticket = self.state.lock().await.begin_search(params);

        let resolution = resolve(self.fetcher.as_ref(), &request).await;

        let applied = self.state.lock().await.complete_search(ticket, resolution);
        if !applied {
            debug!(generation = ticket.generation(), "search result superseded");
        }
        applied
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    pub async fn update_filters(&self, update: FilterUpdate) {
        self.state.lock().await.update_filters(update);
    }

    pub async fn reset_filters(&self) {
        self.state.lock().await.reset_filters();
    }

    pub async fn clear_search(&self) {
        self.state.lock().await.clear();
    }
}

async fn resolve<F: FlightFetcher + ?Sized>(fetcher: &F, request: &SearchRequest) -> SearchResolution {
    match fetcher.fetch(request).await {
        Ok(response) => SearchResolution::Response {
            status: response.status,
            body: response.body,
        },
        Err(err) => SearchResolution::TransportFailure(err.message()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{
        entities::{parse_iso_date, Airport, FlightSearchResponse},
        filters::tests::flight,
        search_state::{FailureKind, UNEXPECTED_ERROR},
    };
    use crate::infra::flight_api::FetchResponse;

    struct Canned(fn() -> Result<FetchResponse, FetchError>);

    #[async_trait]
    impl FlightFetcher for Canned {
        async fn fetch(&self, _request: &SearchRequest) -> Result<FetchResponse, FetchError> {
            (self.0)()
        }
    }

    fn params() -> SearchParams {
        SearchParams::new(
            Airport::new("JFK", "John F Kennedy International", "New York"),
            Airport::new("LAX", "Los Angeles International", "Los Angeles"),
            parse_iso_date("2024-05-01").unwrap(),
            1,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn success_resets_filters_to_price_ceiling() {
        let mut search = FlightSearch::new(Canned(|| {
            Ok(FetchResponse::ok(FlightSearchResponse::success(vec![
                flight("a", "Delta", "DL", 210.4, 0),
                flight("b", "United", "UA", 480.2, 0),
            ])))
        }));
        search.update_filters(FilterUpdate::max_price(50.0));

        assert_eq!(search.search(params()).await, SearchStatus::Success);
        let state = search.state();
        assert_eq!(state.flights().len(), 2);
        assert_eq!(state.filters().max_price, 481.0);
        assert_eq!(state.filtered_flights().len(), 2);
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn bad_status_without_error_body() {
        let mut search = FlightSearch::new(Canned(|| {
            Ok(FetchResponse {
                status: 503,
                body: FlightSearchResponse::default(),
            })
        }));
        assert_eq!(search.search(params()).await, SearchStatus::Failure);
        assert_eq!(search.state().error(), Some("Search failed: 503"));
        assert_eq!(search.state().failure().unwrap().kind, FailureKind::HttpStatus);
    }

    #[tokio::test]
    async fn transport_failure_without_message() {
        let mut search = FlightSearch::new(Canned(|| Err(FetchError::Unknown)));
        assert_eq!(search.search(params()).await, SearchStatus::Failure);
        assert_eq!(search.state().error(), Some(UNEXPECTED_ERROR));
        assert!(search.state().flights().is_empty());
    }

    #[tokio::test]
    async fn clear_returns_to_idle() {
        let mut search = FlightSearch::new(Canned(|| {
            Ok(FetchResponse::ok(FlightSearchResponse::success(vec![flight(
                "a", "Delta", "DL", 210.0, 0,
            )])))
        }));
        search.search(params()).await;
        search.clear_search();
        assert_eq!(search.state().status(), SearchStatus::Idle);
        assert!(!search.state().has_searched());
        assert!(search.state().search_params().is_none());
    }

    #[tokio::test]
    async fn handle_shares_state_between_clones() {
        let handle = SearchHandle::new(Canned(|| {
            Ok(FetchResponse::ok(FlightSearchResponse::success(vec![flight(
                "a", "Delta", "DL", 99.0, 1,
            )])))
        }));
        let other = handle.clone();
        assert!(other.search(params()).await);
        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.status(), SearchStatus::Success);
        assert_eq!(snapshot.flights().len(), 1);
    }
}
