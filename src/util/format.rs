//! Display helpers for flight cards and chart labels.

use crate::domain::entities::parse_timestamp;

/// `2h 5m`, `2h`, `45m` or `0m`.
pub fn format_duration(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.unsigned_abs();
    let (hours, mins) = (minutes / 60, minutes % 60);

    match (hours, mins) {
        (0, 0) => "0m".to_string(),
        (0, m) => format!("{sign}{m}m"),
        (h, 0) => format!("{sign}{h}h"),
        (h, m) => format!("{sign}{h}h {m}m"),
    }
}

pub fn stops_label(stops: u32) -> String {
    match stops {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

/// Whole-unit price with currency symbol and thousands separators,
/// e.g. `$1,250`.
pub fn format_price(price: f64, currency: &str) -> String {
    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match currency.to_ascii_uppercase().as_str() {
        "USD" => format!("{sign}${grouped}"),
        "EUR" => format!("{sign}€{grouped}"),
        "GBP" => format!("{sign}£{grouped}"),
        other => format!("{sign}{other} {grouped}"),
    }
}

/// Clock time of an ISO timestamp, e.g. `08:05 AM`. Unparseable input is
/// returned unchanged.
pub fn format_time(iso: &str) -> String {
    let Some(dt) = parse_timestamp(iso) else {
        return iso.to_string();
    };
    let (hour, minute) = (dt.hour(), dt.minute());
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12:02}:{minute:02} {period}")
}

/// Short calendar date of an ISO timestamp, e.g. `Wed, May 1`.
pub fn format_date(iso: &str) -> String {
    let Some(dt) = parse_timestamp(iso) else {
        return iso.to_string();
    };
    let weekday = dt.weekday().to_string();
    let month = dt.month().to_string();
    format!(
        "{}, {} {}",
        &weekday[..3],
        &month[..3],
        dt.day()
    )
}
