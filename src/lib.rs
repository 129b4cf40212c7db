//! Flight search pipeline: raw provider records are turned into priced
//! flights, filtered, summarised for charts and driven through a search
//! lifecycle.

pub mod app;
pub mod domain;
pub mod infra;
pub mod util;

pub use app::{FlightSearch, SearchHandle};
pub use util::config::Settings;
