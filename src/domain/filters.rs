//! Flight filtering and filter-panel helpers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entities::{FilterState, Flight};

/// Bounds for the price slider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Used when there are no flights to derive a range from.
    pub const EMPTY: PriceRange = PriceRange {
        min: 0.0,
        max: 1000.0,
    };
}

impl FilterState {
    pub fn matches(&self, flight: &Flight) -> bool {
        if flight.price > self.max_price {
            return false;
        }
        if !self.stops.is_empty() && !self.stops.iter().any(|b| b.matches(flight.stops)) {
            return false;
        }
        if !self.airlines.is_empty() && !self.airlines.contains(&flight.airline_code) {
            return false;
        }
        true
    }
}

/// Flights satisfying every active filter, in input order.
pub fn filter_flights(flights: &[Flight], filters: &FilterState) -> Vec<Flight> {
    flights
        .iter()
        .filter(|flight| filters.matches(flight))
        .cloned()
        .collect()
}

/// Distinct airline codes, sorted.
pub fn unique_airlines(flights: &[Flight]) -> Vec<String> {
    flights
        .iter()
        .map(|f| f.airline_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn price_range(flights: &[Flight]) -> PriceRange {
    let mut prices = flights.iter().map(|f| f.price);
    let Some(first) = prices.next() else {
        return PriceRange::EMPTY;
    };
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    PriceRange {
        min: min.floor(),
        max: max.ceil(),
    }
}
