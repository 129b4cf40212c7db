//! Static reference data for the search form: airport suggestions and known
//! airline names.

use super::entities::Airport;

const POPULAR_AIRPORTS: [(&str, &str, &str); 12] = [
    ("JFK", "John F. Kennedy International", "New York"),
    ("LAX", "Los Angeles International", "Los Angeles"),
    ("ORD", "O'Hare International", "Chicago"),
    ("DFW", "Dallas/Fort Worth International", "Dallas"),
    ("DEN", "Denver International", "Denver"),
    ("SFO", "San Francisco International", "San Francisco"),
    ("SEA", "Seattle-Tacoma International", "Seattle"),
    ("ATL", "Hartsfield-Jackson Atlanta", "Atlanta"),
    ("BOS", "Logan International", "Boston"),
    ("MIA", "Miami International", "Miami"),
    ("LHR", "Heathrow", "London"),
    ("CDG", "Charles de Gaulle", "Paris"),
];

const AIRLINES: [(&str, &str); 14] = [
    ("AA", "American Airlines"),
    ("UA", "United Airlines"),
    ("DL", "Delta Air Lines"),
    ("SW", "Southwest Airlines"),
    ("B6", "JetBlue Airways"),
    ("AS", "Alaska Airlines"),
    ("NK", "Spirit Airlines"),
    ("F9", "Frontier Airlines"),
    ("WN", "Southwest"),
    ("LH", "Lufthansa"),
    ("BA", "British Airways"),
    ("AF", "Air France"),
    ("KL", "KLM Royal Dutch"),
    ("EK", "Emirates"),
];

pub fn popular_airports() -> Vec<Airport> {
    POPULAR_AIRPORTS
        .iter()
        .map(|(code, name, city)| Airport::new(code, name, city))
        .collect()
}

/// Popular airports whose code, city or name contains `query`, ignoring case.
/// A blank query returns the full list.
pub fn search_airports(query: &str) -> Vec<Airport> {
    let needle = query.trim().to_lowercase();
    popular_airports()
        .into_iter()
        .filter(|airport| {
            needle.is_empty()
                || airport.code.to_lowercase().contains(&needle)
                || airport.city.to_lowercase().contains(&needle)
                || airport.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Suggestion label, e.g. `New York (JFK)`.
pub fn airport_label(airport: &Airport) -> String {
    format!("{} ({})", airport.city, airport.code)
}

/// Known airline name for an IATA code, or the code itself.
pub fn airline_name(code: &str) -> String {
    AIRLINES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_code_city_and_name() {
        let codes = |q: &str| -> Vec<String> { search_airports(q).into_iter().map(|a| a.code).collect() };
        assert_eq!(codes("jfk"), vec!["JFK"]);
        assert_eq!(codes("paris"), vec!["CDG"]);
        assert_eq!(codes("heathrow"), vec!["LHR"]);
        assert_eq!(search_airports("  ").len(), POPULAR_AIRPORTS.len());
        assert!(search_airports("zzz").is_empty());
    }

    #[test]
    fn airline_names_fall_back_to_code() {
        assert_eq!(airline_name("nk"), "Spirit Airlines");
        assert_eq!(airline_name("QF"), "QF");
    }

    #[test]
    fn labels_show_city_and_code() {
        let airport = &popular_airports()[0];
        assert_eq!(airport_label(airport), "New York (JFK)");
    }
}
