use std::{
    collections::BTreeSet,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, Date, Month, OffsetDateTime};

use super::search_state::FailureKind;

/// A named location identified by its IATA code.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
}

impl Airport {
    pub fn new(code: &str, name: &str, city: &str) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
            name: name.to_string(),
            city: city.to_string(),
        }
    }
}

// Two airports are the same airport when their codes agree.
impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Hash for Airport {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// One non-connecting flight segment as shown in search results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub airline_code: String,
    pub flight_number: String,
    pub origin: Airport,
    pub destination: Airport,
    /// ISO-8601 timestamp as reported upstream.
    pub departure_time: String,
    pub arrival_time: String,
    /// Minutes between departure and arrival. Negative values are kept as-is.
    pub duration: i64,
    pub stops: u32,
    pub price: f64,
    pub currency: String,
    pub seats_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin: Option<String>,
}

impl Flight {
    pub fn departure(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.departure_time)
    }

    pub fn arrival(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.arrival_time)
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).ok()
}

/// Label identifying which upstream provider produced a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "aviationstack")]
    AviationStack,
}

impl DataSource {
    pub fn tag(&self) -> &'static str {
        match self {
            DataSource::AviationStack => "aviationstack",
        }
    }
}

/// Body returned by the flight-search endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchResponse {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl FlightSearchResponse {
    pub fn success(flights: Vec<Flight>) -> Self {
        Self {
            flights,
            source: Some(DataSource::AviationStack),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(message: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            flights: Vec::new(),
            source: Some(DataSource::AviationStack),
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }
}

/// Airport selection coming from a search form: either picked from the
/// suggestion list or typed in by hand.
#[derive(Clone, Debug, PartialEq)]
pub enum AirportInput {
    Selected(Airport),
    FreeText(String),
}

impl AirportInput {
    /// Normalizes the input to an airport. Blank free text resolves to nothing.
    pub fn resolve(&self) -> Option<Airport> {
        match self {
            AirportInput::Selected(airport) => Some(airport.clone()),
            AirportInput::FreeText(text) => {
                let code = text.trim().to_ascii_uppercase();
                if code.is_empty() {
                    return None;
                }
                Some(Airport {
                    name: format!("{code} Airport"),
                    city: code.clone(),
                    code,
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchParamsError {
    #[error("origin airport is required")]
    MissingOrigin,
    #[error("destination airport is required")]
    MissingDestination,
    #[error("departure date is required")]
    MissingDepartureDate,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("at least one passenger is required")]
    NoPassengers,
}

/// One user search request. Built once per search action and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
    pub origin: Airport,
    pub destination: Airport,
    pub departure_date: Date,
    pub return_date: Option<Date>,
    pub passengers: u32,
}

impl SearchParams {
    pub fn new(
        origin: Airport,
        destination: Airport,
        departure_date: Date,
        passengers: u32,
    ) -> Result<Self, SearchParamsError> {
        if passengers == 0 {
            return Err(SearchParamsError::NoPassengers);
        }
        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date: None,
            passengers,
        })
    }

    /// Builds params from raw form values. Dates are `YYYY-MM-DD`; a blank
    /// return date means one-way.
    pub fn from_inputs(
        origin: Option<&AirportInput>,
        destination: Option<&AirportInput>,
        departure_date: &str,
        return_date: &str,
    ) -> Result<Self, SearchParamsError> {
        let origin = origin
            .and_then(AirportInput::resolve)
            .ok_or(SearchParamsError::MissingOrigin)?;
        let destination = destination
            .and_then(AirportInput::resolve)
            .ok_or(SearchParamsError::MissingDestination)?;

        if departure_date.trim().is_empty() {
            return Err(SearchParamsError::MissingDepartureDate);
        }
        let departure_date = parse_iso_date(departure_date)
            .ok_or_else(|| SearchParamsError::InvalidDate(departure_date.trim().to_string()))?;

        let return_date = if return_date.trim().is_empty() {
            None
        } else {
            Some(
                parse_iso_date(return_date)
                    .ok_or_else(|| SearchParamsError::InvalidDate(return_date.trim().to_string()))?,
            )
        };

        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date,
            passengers: 1,
        })
    }

    pub fn with_return_date(mut self, date: Date) -> Self {
        self.return_date = Some(date);
        self
    }

    pub fn swapped(&self) -> Self {
        Self {
            origin: self.destination.clone(),
            destination: self.origin.clone(),
            ..self.clone()
        }
    }

    /// Departure date as `YYYY-MM-DD`.
    pub fn departure_date_iso(&self) -> String {
        format_iso_date(self.departure_date)
    }
}

pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u8>().ok()?;
    let day = parts.next()?.parse::<u8>().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Stop-count bucket used by the stops filter. `TwoPlus` covers every flight
/// with two or more stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopsBucket {
    Nonstop,
    OneStop,
    TwoPlus,
}

impl StopsBucket {
    pub fn matches(&self, stops: u32) -> bool {
        match self {
            StopsBucket::Nonstop => stops == 0,
            StopsBucket::OneStop => stops == 1,
            StopsBucket::TwoPlus => stops >= 2,
        }
    }
}

impl TryFrom<u8> for StopsBucket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StopsBucket::Nonstop),
            1 => Ok(StopsBucket::OneStop),
            2 => Ok(StopsBucket::TwoPlus),
            other => Err(format!("unknown stops bucket {other}")),
        }
    }
}

impl From<StopsBucket> for u8 {
    fn from(value: StopsBucket) -> Self {
        match value {
            StopsBucket::Nonstop => 0,
            StopsBucket::OneStop => 1,
            StopsBucket::TwoPlus => 2,
        }
    }
}

/// Price ceiling used before any search has produced results.
pub const INITIAL_MAX_PRICE: f64 = 10_000.0;

/// User-selected constraints narrowing a flight list.
/// An empty `stops` or `airlines` set places no restriction on that dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub max_price: f64,
    #[serde(default)]
    pub stops: BTreeSet<StopsBucket>,
    #[serde(default)]
    pub airlines: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_max_price(INITIAL_MAX_PRICE)
    }
}

impl FilterState {
    pub fn with_max_price(max_price: f64) -> Self {
        Self {
            max_price,
            stops: BTreeSet::new(),
            airlines: BTreeSet::new(),
        }
    }

    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(max_price) = update.max_price {
            self.max_price = max_price;
        }
        if let Some(stops) = update.stops {
            self.stops = stops;
        }
        if let Some(airlines) = update.airlines {
            self.airlines = airlines;
        }
    }
}

/// Partial filter change; `None` fields leave the current value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterUpdate {
    pub max_price: Option<f64>,
    pub stops: Option<BTreeSet<StopsBucket>>,
    pub airlines: Option<BTreeSet<String>>,
}

impl FilterUpdate {
    pub fn max_price(value: f64) -> Self {
        Self {
            max_price: Some(value),
            ..Self::default()
        }
    }

    pub fn stops<I: IntoIterator<Item = StopsBucket>>(buckets: I) -> Self {
        Self {
            stops: Some(buckets.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn airlines<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            airlines: Some(codes.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfk() -> Airport {
        Airport::new("JFK", "John F. Kennedy International", "New York")
    }

    #[test]
    fn airports_compare_by_code() {
        let other = Airport::new("jfk", "Kennedy", "NYC");
        assert_eq!(jfk(), other);
        assert_ne!(jfk(), Airport::new("LAX", "John F. Kennedy International", "New York"));
    }

    #[test]
    fn free_text_airport_is_normalized() {
        let airport = AirportInput::FreeText(" sfo ".into()).resolve().unwrap();
        assert_eq!(airport.code, "SFO");
        assert_eq!(airport.city, "SFO");
        assert_eq!(airport.name, "SFO Airport");
        assert!(AirportInput::FreeText("   ".into()).resolve().is_none());
    }

    #[test]
    fn search_params_from_inputs() {
        let origin = AirportInput::Selected(jfk());
        let destination = AirportInput::FreeText("lhr".into());
        let params =
            SearchParams::from_inputs(Some(&origin), Some(&destination), "2024-05-01", "").unwrap();
        assert_eq!(params.origin.code, "JFK");
        assert_eq!(params.destination.code, "LHR");
        assert_eq!(params.departure_date_iso(), "2024-05-01");
        assert_eq!(params.return_date, None);
        assert_eq!(params.passengers, 1);

        let swapped = params.swapped();
        assert_eq!(swapped.origin.code, "LHR");
        assert_eq!(swapped.destination.code, "JFK");
    }

    #[test]
    fn search_params_reject_incomplete_input() {
        let origin = AirportInput::Selected(jfk());
        assert_eq!(
            SearchParams::from_inputs(None, Some(&origin), "2024-05-01", ""),
            Err(SearchParamsError::MissingOrigin)
        );
        assert_eq!(
            SearchParams::from_inputs(Some(&origin), Some(&origin), " ", ""),
            Err(SearchParamsError::MissingDepartureDate)
        );
        assert_eq!(
            SearchParams::from_inputs(Some(&origin), Some(&origin), "2024-02-30", ""),
            Err(SearchParamsError::InvalidDate("2024-02-30".into()))
        );
        let date = parse_iso_date("2024-05-01").unwrap();
        assert_eq!(
            SearchParams::new(jfk(), jfk(), date, 0),
            Err(SearchParamsError::NoPassengers)
        );
    }

    #[test]
    fn stops_bucket_two_means_two_or_more() {
        assert!(StopsBucket::TwoPlus.matches(2));
        assert!(StopsBucket::TwoPlus.matches(3));
        assert!(!StopsBucket::TwoPlus.matches(1));
        assert!(StopsBucket::Nonstop.matches(0));
    }

    #[test]
    fn filter_update_only_touches_given_fields() {
        let mut filters = FilterState::default();
        filters.apply(FilterUpdate::airlines(["AA", "DL"]));
        filters.apply(FilterUpdate::max_price(450.0));
        assert_eq!(filters.max_price, 450.0);
        assert_eq!(filters.airlines.len(), 2);
        assert!(filters.stops.is_empty());
    }

    #[test]
    fn search_response_accepts_minimal_body() {
        let body = r#"{"flights":[],"error":"No flights found for this route"}"#;
        let response: FlightSearchResponse = serde_json::from_str(body).unwrap();
        assert!(response.flights.is_empty());
        assert_eq!(response.source, None);
        assert_eq!(response.error.as_deref(), Some("No flights found for this route"));
    }

    #[test]
    fn filter_state_stops_serialize_as_numbers() {
        let mut filters = FilterState::with_max_price(300.0);
        filters.stops.insert(StopsBucket::TwoPlus);
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["stops"], serde_json::json!([2]));
        assert_eq!(json["maxPrice"], serde_json::json!(300.0));
    }
}
