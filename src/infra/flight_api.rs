//! The network seam of the search flow.
//!
//! [`FlightFetcher`] is what the orchestrator calls. Two implementations:
//! [`FlightApiClient`] talks to a flight-search HTTP endpoint, and
//! [`AviationStackFetcher`] answers the same request in-process by calling
//! the provider and transforming its records.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, info};

use super::aviationstack::{AviationStackClient, ProviderError};
use crate::domain::entities::{FlightSearchResponse, SearchParams};
use crate::domain::pricing::PriceEstimator;
use crate::domain::search_state::FailureKind;
use crate::domain::transform::{transform_batch, RawFlightRecord};
use crate::util::config::Settings;
use crate::util::version::user_agent;

pub const MISSING_PARAMETERS: &str = "Missing required parameters: origin, destination, date";

/// Query sent to the flight-search endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
}

impl From<&SearchParams> for SearchRequest {
    fn from(params: &SearchParams) -> Self {
        Self {
            origin: params.origin.code.clone(),
            destination: params.destination.code.clone(),
            date: params.departure_date_iso(),
        }
    }
}

impl SearchRequest {
    pub fn is_complete(&self) -> bool {
        [&self.origin, &self.destination, &self.date]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: FlightSearchResponse,
}

impl FetchResponse {
    pub fn ok(body: FlightSearchResponse) -> Self {
        Self { status: 200, body }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Transport(String),
    /// Failure that carried no description.
    #[error("request failed")]
    Unknown,
}

impl FetchError {
    pub fn message(&self) -> Option<String> {
        match self {
            FetchError::Unknown => None,
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
pub trait FlightFetcher: Send + Sync {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchResponse, FetchError>;
}

/// HTTP client for `GET <endpoint>?origin=..&destination=..&date=..`.
#[derive(Clone)]
pub struct FlightApiClient {
    http: Client,
    endpoint: Url,
}

impl FlightApiClient {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        Self::from_settings(&Settings {
            search_endpoint: endpoint.to_string(),
            ..Settings::default()
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&settings.search_endpoint)?;
        let mut builder = Client::builder().user_agent(user_agent());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    pub fn request_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("origin", &request.origin)
            .append_pair("destination", &request.destination)
            .append_pair("date", &request.date);
        url
    }
}

#[async_trait]
impl FlightFetcher for FlightApiClient {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchResponse, FetchError> {
        let url = self.request_url(request);
        debug!(%url, "requesting flight search");

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_response(status, &text)
    }
}

/// A 2xx body must decode. Any other status keeps whatever body decodes and
/// otherwise falls back to an empty one, so the status itself is reported.
pub fn decode_response(status: u16, text: &str) -> Result<FetchResponse, FetchError> {
    if (200..300).contains(&status) {
        let body = serde_json::from_str(text)?;
        return Ok(FetchResponse { status, body });
    }
    let body = serde_json::from_str(text).unwrap_or_else(|err| {
        debug!(%status, %err, "undecodable error response body");
        FlightSearchResponse::default()
    });
    Ok(FetchResponse { status, body })
}

/// Answers searches directly from aviationstack, shaping provider errors into
/// response bodies the way the search endpoint does.
pub struct AviationStackFetcher {
    client: AviationStackClient,
    estimator: PriceEstimator,
    rng: Mutex<StdRng>,
}

impl AviationStackFetcher {
    pub fn new(client: AviationStackClient) -> Self {
        Self::with_rng(client, StdRng::from_os_rng())
    }

    /// Fixed random source, for reproducible prices and seat counts.
    pub fn with_rng(client: AviationStackClient, rng: StdRng) -> Self {
        Self {
            client,
            estimator: PriceEstimator::default(),
            rng: Mutex::new(rng),
        }
    }

    pub fn with_estimator(mut self, estimator: PriceEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        Ok(Self::new(AviationStackClient::from_settings(settings)?))
    }

    /// Turns a provider outcome into the endpoint's response shape. Provider
    /// errors are reported in the body with status 200.
    pub fn respond(&self, outcome: Result<Vec<RawFlightRecord>, ProviderError>) -> FetchResponse {
        match outcome {
            Ok(records) => {
                let flights = {
                    let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    transform_batch(&records, &self.estimator, &mut *rng)
                };
                info!(raw = records.len(), flights = flights.len(), "transformed provider flights");
                FetchResponse::ok(FlightSearchResponse::success(flights))
            }
            Err(error) => FetchResponse::ok(FlightSearchResponse::failure(
                error.user_message(),
                error.kind(),
            )),
        }
    }
}

#[async_trait]
impl FlightFetcher for AviationStackFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchResponse, FetchError> {
        if !request.is_complete() {
            return Ok(FetchResponse {
                status: 400,
                body: FlightSearchResponse {
                    source: None,
                    ..FlightSearchResponse::failure(MISSING_PARAMETERS, FailureKind::InvalidRequest)
                },
            });
        }

        let outcome = self
            .client
            .search_flights(&request.origin, &request.destination, &request.date)
            .await;
        Ok(self.respond(outcome))
    }
}
