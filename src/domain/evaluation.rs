use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use super::entities::Flight;

/// Number of airlines kept in the price chart.
pub const CHART_AIRLINE_LIMIT: usize = 8;

const BELOW_AVERAGE_RATIO: f64 = 0.85;
const ABOVE_AVERAGE_RATIO: f64 = 1.15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Descriptive statistics over flight prices, each rounded to whole units.
/// All zero for an empty list.
pub fn price_stats(flights: &[Flight]) -> PriceStats {
    if flights.is_empty() {
        return PriceStats::default();
    }

    let mut prices: Vec<f64> = flights.iter().map(|f| f.price).collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = prices.len();
    let mid = count / 2;
    let median = if count % 2 == 1 {
        prices[mid]
    } else {
        (prices[mid - 1] + prices[mid]) / 2.0
    };

    PriceStats {
        avg: (prices.iter().sum::<f64>() / count as f64).round(),
        min: prices[0].round(),
        max: prices[count - 1].round(),
        median: median.round(),
    }
}

/// Per-airline summary row for the price chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Short label: first word of the airline name.
    pub airline: String,
    pub full_name: String,
    pub price: f64,
    pub stops: f64,
    pub count: usize,
}

/// Groups flights by airline name, averages price and stops per group and
/// keeps the cheapest [`CHART_AIRLINE_LIMIT`] groups, cheapest first.
pub fn chart_aggregate(flights: &[Flight]) -> Vec<ChartRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, (Vec<f64>, Vec<u32>)> = HashMap::new();

    for flight in flights {
        let entry = groups.entry(flight.airline.as_str()).or_insert_with(|| {
            order.push(flight.airline.as_str());
            (Vec::new(), Vec::new())
        });
        entry.0.push(flight.price);
        entry.1.push(flight.stops);
    }

    let mut rows: Vec<ChartRow> = order
        .into_iter()
        .filter_map(|name| {
            let (prices, stops) = groups.get(name)?;
            let count = prices.len();
            Some(ChartRow {
                airline: name.split(' ').next().unwrap_or(name).to_string(),
                full_name: name.to_string(),
                price: (prices.iter().sum::<f64>() / count as f64).round(),
                stops: (stops.iter().map(|s| f64::from(*s)).sum::<f64>() / count as f64).round(),
                count,
            })
        })
        .collect();

    // Stable sort: equal averages keep first-seen order.
    rows.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
    rows.truncate(CHART_AIRLINE_LIMIT);
    rows
}

/// One flight as a chart data point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub id: String,
    pub airline: String,
    pub price: f64,
    pub stops: u32,
}

pub fn chart_points(flights: &[Flight]) -> Vec<ChartPoint> {
    flights
        .iter()
        .map(|flight| ChartPoint {
            id: flight.id.clone(),
            airline: flight.airline.clone(),
            price: flight.price,
            stops: flight.stops,
        })
        .collect()
}

/// Where a price sits relative to the average, for bar colouring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceBand {
    BelowAverage,
    Average,
    AboveAverage,
}

impl PriceBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowAverage => "Below avg",
            Self::Average => "Average",
            Self::AboveAverage => "Above avg",
        }
    }
}

pub fn price_band(price: f64, average: f64) -> PriceBand {
    if price <= average * BELOW_AVERAGE_RATIO {
        PriceBand::BelowAverage
    } else if price >= average * ABOVE_AVERAGE_RATIO {
        PriceBand::AboveAverage
    } else {
        PriceBand::Average
    }
}
