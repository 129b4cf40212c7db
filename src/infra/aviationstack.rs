//! Thin asynchronous client for the aviationstack flight-status API.
//!
//! - One `GET flights` per search, filtered by departure and arrival IATA.
//! - The provider has no fares; callers run the records through
//!   [`transform_batch`](crate::domain::transform::transform_batch).

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::search_state::FailureKind;
use crate::domain::transform::RawFlightRecord;
use crate::util::config::Settings;
use crate::util::version::user_agent;

pub const MISSING_API_KEY: &str = "API key not configured";
pub const INVALID_RESPONSE: &str = "API returned invalid response";
pub const GENERIC_API_ERROR: &str = "API error occurred";
pub const NO_FLIGHTS: &str = "No flights found for this route";
pub const FETCH_FAILED: &str = "Failed to fetch flights";

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned invalid response")]
    InvalidResponse,
    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
    },
    #[error("API request failed: {0}")]
    Status(u16),
    #[error("No flights found for this route")]
    NoFlights,
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::MissingApiKey => FailureKind::Configuration,
            ProviderError::InvalidResponse | ProviderError::Api { .. } => FailureKind::Upstream,
            ProviderError::NoFlights => FailureKind::NoResults,
            ProviderError::Status(_) => FailureKind::HttpStatus,
            ProviderError::InvalidUrl(_) | ProviderError::Http(_) => FailureKind::Transport,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FETCH_FAILED.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorDto,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FlightsEnvelope {
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    data: Option<Vec<RawFlightRecord>>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Clone)]
pub struct AviationStackClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    limit: u32,
}

impl AviationStackClient {
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::from_settings(&Settings {
            api_key,
            ..Settings::default()
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&settings.provider_base_url)?;
        let mut builder = Client::builder().user_agent(user_agent());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            limit: settings.request_limit,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Scheduled flights from `origin` to `destination`. The provider's free
    /// tier has no date filter, so `date` is only logged.
    pub async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> Result<Vec<RawFlightRecord>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let url = self.flights_url(api_key, origin, destination)?;

        info!(%origin, %destination, %date, limit = self.limit, "requesting aviationstack flights");
        debug!(url = %redacted(&url), "aviationstack request");

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let records = parse_flights_body(status, &body)?;
        info!(count = records.len(), %origin, %destination, "aviationstack returned flights");
        Ok(records)
    }

    fn flights_url(&self, api_key: &str, origin: &str, destination: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.join("flights")?;
        url.query_pairs_mut()
            .append_pair("access_key", api_key)
            .append_pair("dep_iata", origin)
            .append_pair("arr_iata", destination)
            .append_pair("limit", &self.limit.to_string());
        Ok(url)
    }
}

/// URL with the access key masked, for logging.
fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// Interprets a provider response body. A body-level error object takes
/// precedence over the HTTP status; an empty `data` array means the route has
/// no flights.
pub fn parse_flights_body(status: u16, body: &str) -> Result<Vec<RawFlightRecord>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|_| {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        warn!(%status, body = %preview, "aviationstack returned non-JSON response");
        ProviderError::InvalidResponse
    })?;

    if value.get("error").is_some() {
        let envelope: Option<ErrorEnvelope> = serde_json::from_value(value).ok();
        let (message, code) = envelope
            .map(|e| (e.error.message, e.error.code))
            .unwrap_or((None, None));
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
        let code = code.map(|c| match c {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        warn!(%message, ?code, "aviationstack API error");
        return Err(ProviderError::Api { message, code });
    }

    if !(200..300).contains(&status) {
        return Err(ProviderError::Status(status));
    }

    let envelope: FlightsEnvelope =
        serde_json::from_value(value).map_err(|_| ProviderError::InvalidResponse)?;
    if let Some(pagination) = envelope.pagination {
        debug!(
            count = pagination.count,
            total = pagination.total,
            offset = pagination.offset,
            "aviationstack pagination"
        );
    }

    match envelope.data {
        Some(records) if !records.is_empty() => Ok(records),
        _ => Err(ProviderError::NoFlights),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flight_records() {
        let body = r#"{
            "pagination": {"limit": 100, "offset": 0, "count": 1, "total": 1},
            "data": [{
                "flight_date": "2024-05-01",
                "departure": {"airport": "John F Kennedy International", "iata": "JFK", "scheduled": "2024-05-01T08:00:00+00:00"},
                "arrival": {"airport": "Los Angeles International", "iata": "LAX", "scheduled": "2024-05-01T11:10:00+00:00"},
                "airline": {"name": "Delta Air Lines", "iata": "DL", "icao": "DAL"},
                "flight": {"number": "300", "iata": "DL300", "icao": "DAL300"}
            }]
        }"#;
        let records = parse_flights_body(200, body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].departure_iata(), Some("JFK"));
        assert_eq!(records[0].flight_iata(), Some("DL300"));
    }

    #[test]
    fn non_json_is_invalid_response() {
        let err = parse_flights_body(200, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse));
        assert_eq!(err.user_message(), INVALID_RESPONSE);
        assert_eq!(err.kind(), FailureKind::Upstream);
    }

    #[test]
    fn body_error_beats_status() {
        let body = r#"{"error": {"code": "invalid_access_key", "message": "You have not supplied a valid API Access Key."}}"#;
        let err = parse_flights_body(401, body).unwrap_err();
        match &err {
            ProviderError::Api { message, code } => {
                assert_eq!(message, "You have not supplied a valid API Access Key.");
                assert_eq!(code.as_deref(), Some("invalid_access_key"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.user_message(), "You have not supplied a valid API Access Key.");
    }

    #[test]
    fn error_without_message_uses_generic_text() {
        let err = parse_flights_body(200, r#"{"error": {"code": 104}}"#).unwrap_err();
        assert_eq!(err.user_message(), GENERIC_API_ERROR);
    }

    #[test]
    fn bad_status_without_error_body() {
        let err = parse_flights_body(500, r#"{"data": []}"#).unwrap_err();
        assert_eq!(err.user_message(), "API request failed: 500");
        assert_eq!(err.kind(), FailureKind::HttpStatus);
    }

    #[test]
    fn empty_data_means_no_flights() {
        let err = parse_flights_body(200, r#"{"pagination": {}, "data": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NoFlights));
        assert_eq!(err.kind(), FailureKind::NoResults);
        assert_eq!(err.user_message(), NO_FLIGHTS);

        let err = parse_flights_body(200, r#"{}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NoFlights));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = AviationStackClient::new(Some("  ".into())).unwrap();
        assert!(!client.has_api_key());
        let err = client.search_flights("JFK", "LAX", "2024-05-01").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert_eq!(err.user_message(), MISSING_API_KEY);
    }

    #[test]
    fn logged_url_hides_access_key() {
        let client = AviationStackClient::new(Some("secret".into())).unwrap();
        let url = client.flights_url("secret", "JFK", "LAX").unwrap();
        let logged = redacted(&url);
        assert!(!logged.contains("secret"));
        assert!(logged.contains("dep_iata=JFK"));
    }

    #[test]
    fn request_url_carries_query() {
        let client = AviationStackClient::new(Some("key".into())).unwrap();
        let url = client.flights_url("key", "JFK", "LAX").unwrap();
        assert_eq!(url.path(), "/v1/flights");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("access_key".to_string(), "key".to_string()),
                ("dep_iata".to_string(), "JFK".to_string()),
                ("arr_iata".to_string(), "LAX".to_string()),
                ("limit".to_string(), "100".to_string()),
            ]
        );
    }
}
