pub const APP_NAME: &str = "Flight Fare Scanner";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_label() -> String {
    format!("v{APP_VERSION}")
}

/// `User-Agent` sent with every outbound request.
pub fn user_agent() -> String {
    format!("flight-fare-scanner/{APP_VERSION}")
}
