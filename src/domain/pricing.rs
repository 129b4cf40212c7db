//! Synthetic fare estimation for providers that report schedules but no fares.
//!
//! `price = round(base × airline tier × time-of-day tier × variance)` where the
//! variance is drawn from the supplied RNG on every call, so repeated estimates
//! for the same flight differ.

use rand::Rng;
use time::OffsetDateTime;

pub const BASE_PRICE: f64 = 150.0;
pub const PREMIUM_TIER: f64 = 1.8;
pub const BUDGET_TIER: f64 = 0.7;
pub const RED_EYE_TIER: f64 = 0.85;
pub const PEAK_TIER: f64 = 1.3;
pub const VARIANCE_MIN: f64 = 0.8;
pub const VARIANCE_MAX: f64 = 1.2;

const PREMIUM_AIRLINES: [&str; 5] = [
    "Emirates",
    "Qatar Airways",
    "Singapore Airlines",
    "Lufthansa",
    "British Airways",
];
const BUDGET_AIRLINES: [&str; 5] = ["Spirit", "Frontier", "Ryanair", "EasyJet", "Southwest"];

#[derive(Clone, Debug, PartialEq)]
pub struct PriceEstimator {
    pub base_price: f64,
    pub premium_airlines: Vec<String>,
    pub budget_airlines: Vec<String>,
}

impl Default for PriceEstimator {
    fn default() -> Self {
        Self {
            base_price: BASE_PRICE,
            premium_airlines: PREMIUM_AIRLINES.iter().map(|s| s.to_string()).collect(),
            budget_airlines: BUDGET_AIRLINES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PriceEstimator {
    /// Estimates a fare in whole currency units. A departure that could not be
    /// parsed gets the neutral time tier.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        airline_name: &str,
        departure: Option<OffsetDateTime>,
        rng: &mut R,
    ) -> f64 {
        let time_tier = departure.map(|dt| time_of_day_tier(dt.hour())).unwrap_or(1.0);
        let variance = rng.random_range(VARIANCE_MIN..=VARIANCE_MAX);
        (self.base_price * self.airline_tier(airline_name) * time_tier * variance).round()
    }

    /// Premium list is checked first, so a name on both lists counts as premium.
    pub fn airline_tier(&self, airline_name: &str) -> f64 {
        let name = airline_name.to_lowercase();
        let listed = |list: &[String]| list.iter().any(|a| name.contains(&a.to_lowercase()));

        if listed(&self.premium_airlines) {
            PREMIUM_TIER
        } else if listed(&self.budget_airlines) {
            BUDGET_TIER
        } else {
            1.0
        }
    }
}

/// Red-eye hours (before 06:00, after 21:59) are discounted, the 07–09 and
/// 17–19 peaks carry a surcharge.
pub fn time_of_day_tier(hour: u8) -> f64 {
    match hour {
        0..=5 | 22..=23 => RED_EYE_TIER,
        7..=9 | 17..=19 => PEAK_TIER,
        _ => 1.0,
    }
}
