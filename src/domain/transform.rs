//! Mapping of aviationstack flight-status records onto [`Flight`].
//!
//! The provider reports schedules only, so fares come from the
//! [`PriceEstimator`] and seat counts are synthesized.

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use super::entities::{parse_timestamp, Airport, Flight};
use super::pricing::PriceEstimator;

pub const UNKNOWN_AIRLINE: &str = "Unknown Airline";
pub const UNKNOWN_AIRLINE_CODE: &str = "XX";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const PLACEHOLDER_AIRCRAFT: &str = "Boeing 737";
pub const DEFAULT_CABIN: &str = "Economy";
const SEATS_MIN: u32 = 5;
const SEATS_MAX: u32 = 54;

/// One entry of the provider's `data` array. Every field is optional because
/// the provider omits or nulls them freely.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFlightRecord {
    #[serde(default)]
    pub flight_date: Option<String>,
    #[serde(default)]
    pub flight_status: Option<String>,
    #[serde(default)]
    pub departure: Option<RawEndpoint>,
    #[serde(default)]
    pub arrival: Option<RawEndpoint>,
    #[serde(default)]
    pub airline: Option<RawAirline>,
    #[serde(default)]
    pub flight: Option<RawFlightNumber>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawEndpoint {
    #[serde(default)]
    pub airport: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub gate: Option<String>,
    #[serde(default)]
    pub delay: Option<i64>,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default)]
    pub estimated: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawAirline {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFlightNumber {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl RawFlightRecord {
    pub fn departure_iata(&self) -> Option<&str> {
        non_blank(self.departure.as_ref().and_then(|e| e.iata.as_ref()))
    }

    pub fn arrival_iata(&self) -> Option<&str> {
        non_blank(self.arrival.as_ref().and_then(|e| e.iata.as_ref()))
    }

    pub fn airline_name(&self) -> Option<&str> {
        non_blank(self.airline.as_ref().and_then(|a| a.name.as_ref()))
    }

    pub fn airline_iata(&self) -> Option<&str> {
        non_blank(self.airline.as_ref().and_then(|a| a.iata.as_ref()))
    }

    pub fn flight_iata(&self) -> Option<&str> {
        non_blank(self.flight.as_ref().and_then(|f| f.iata.as_ref()))
    }

    /// Both endpoints must carry an IATA code and the operating airline must be
    /// identifiable by name or code. A code-only airline is kept and shown as
    /// [`UNKNOWN_AIRLINE`] rather than dropped.
    pub fn has_identity(&self) -> bool {
        self.departure_iata().is_some()
            && self.arrival_iata().is_some()
            && (self.airline_name().is_some() || self.airline_iata().is_some())
    }
}

/// Transforms a provider batch, dropping records without a usable identity.
/// Indices used for synthesized flight numbers count kept records only.
pub fn transform_batch<R: Rng + ?Sized>(
    records: &[RawFlightRecord],
    estimator: &PriceEstimator,
    rng: &mut R,
) -> Vec<Flight> {
    let flights: Vec<Flight> = records
        .iter()
        .filter(|record| record.has_identity())
        .enumerate()
        .map(|(index, record)| transform_flight(record, index, estimator, &mut *rng))
        .collect();

    let dropped = records.len() - flights.len();
    if dropped > 0 {
        debug!(dropped, kept = flights.len(), "dropped provider records without identity");
    }
    flights
}

/// Transforms one record. Never fails: absent fields get placeholder values.
pub fn transform_flight<R: Rng + ?Sized>(
    record: &RawFlightRecord,
    index: usize,
    estimator: &PriceEstimator,
    rng: &mut R,
) -> Flight {
    let airline = record.airline_name().unwrap_or(UNKNOWN_AIRLINE).to_string();
    let airline_code = record
        .airline_iata()
        .unwrap_or(UNKNOWN_AIRLINE_CODE)
        .to_string();
    let flight_number = record
        .flight_iata()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{UNKNOWN_AIRLINE_CODE}{}", 1000 + index));

    let departure_time = scheduled(record.departure.as_ref());
    let arrival_time = scheduled(record.arrival.as_ref());
    let departure = parse_timestamp(&departure_time);
    let duration = match (departure, parse_timestamp(&arrival_time)) {
        (Some(dep), Some(arr)) => ((arr - dep).as_seconds_f64() / 60.0).round() as i64,
        _ => {
            warn!(
                flight = %flight_number,
                departure = %departure_time,
                arrival = %arrival_time,
                "unparseable schedule; duration set to 0"
            );
            0
        }
    };

    let price = estimator.estimate(&airline, departure, rng);
    let seats_available = rng.random_range(SEATS_MIN..=SEATS_MAX);

    Flight {
        id: format!("{flight_number}-{index}"),
        airline,
        airline_code,
        origin: endpoint_airport(record.departure.as_ref(), record.departure_iata()),
        destination: endpoint_airport(record.arrival.as_ref(), record.arrival_iata()),
        flight_number,
        departure_time,
        arrival_time,
        duration,
        stops: 0,
        price,
        currency: DEFAULT_CURRENCY.to_string(),
        seats_available,
        aircraft: Some(PLACEHOLDER_AIRCRAFT.to_string()),
        cabin: Some(DEFAULT_CABIN.to_string()),
    }
}

fn scheduled(endpoint: Option<&RawEndpoint>) -> String {
    endpoint
        .and_then(|e| e.scheduled.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn endpoint_airport(endpoint: Option<&RawEndpoint>, iata: Option<&str>) -> Airport {
    let code = iata.unwrap_or_default().to_ascii_uppercase();
    let name = non_blank(endpoint.and_then(|e| e.airport.as_ref()))
        .map(str::to_string)
        .unwrap_or_else(|| code.clone());
    Airport {
        city: city_from_airport_name(&name, &code),
        name,
        code,
    }
}

/// First word of the airport name, or the code when the name is blank.
pub fn city_from_airport_name(name: &str, code: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or(code)
        .to_string()
}
