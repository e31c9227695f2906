use reqwest::Url;

use placefinder_core::filter::FilterValue;
use placefinder_core::options::{AutocompleteOptions, SearchType};

use super::*;

fn base(path: &str) -> Url {
    Url::parse(&format!("https://api.example.com{path}")).unwrap()
}

#[test]
fn geocode_url_minimal_query() {
    let options = AutocompleteOptions::default();
    let url = geocode_url(&base("/v1/autocomplete"), "test-key", "berlin", &options);
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v1/autocomplete?text=berlin&apiKey=test-key"
    );
}

#[test]
fn geocode_url_includes_type_limit_and_lang_when_set() {
    let options = AutocompleteOptions::new()
        .with_type(SearchType::City)
        .with_limit(5)
        .with_lang("de");
    let url = geocode_url(&base("/v1/autocomplete"), "k", "ber", &options);
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v1/autocomplete?text=ber&apiKey=k&type=city&limit=5&lang=de"
    );
}

#[test]
fn geocode_url_percent_encodes_query_text() {
    let options = AutocompleteOptions::default();
    let url = geocode_url(&base("/v1/autocomplete"), "k", "rue de l'été & co", &options);
    let text = url
        .query_pairs()
        .find(|(name, _)| name == "text")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    assert_eq!(text, "rue de l'été & co");
    assert!(!url.as_str().contains(" & "), "raw ampersand leaked: {url}");
}

#[test]
fn geocode_url_serializes_filter_and_bias_groups() {
    let options = AutocompleteOptions::new()
        .with_address_filter(FilterValue::CountryCodes(vec!["de".to_owned(), "at".to_owned()]))
        .with_address_bias(FilterValue::Proximity {
            lon: 13.4,
            lat: 52.5,
        });
    let url = geocode_url(&base("/v1/autocomplete"), "k", "q", &options);
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(n, v)| (n.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("filter".to_owned(), "countrycode:de,at".to_owned())));
    assert!(pairs.contains(&("bias".to_owned(), "proximity:13.4,52.5".to_owned())));
}

#[test]
fn geocode_url_omits_empty_filter_groups() {
    let options = AutocompleteOptions::default();
    let url = geocode_url(&base("/v1/autocomplete"), "k", "q", &options);
    assert!(url.query_pairs().all(|(name, _)| name != "filter"));
    assert!(url.query_pairs().all(|(name, _)| name != "bias"));
}

#[test]
fn geocode_url_drops_invalid_filter_entries_silently() {
    let options = AutocompleteOptions::new().with_address_filter(FilterValue::Circle {
        lon: 13.4,
        lat: 123.0,
        radius_meters: 500.0,
    });
    let url = geocode_url(&base("/v1/autocomplete"), "k", "q", &options);
    assert!(url.query_pairs().all(|(name, _)| name != "filter"));
}

#[test]
fn place_details_url_carries_id_and_optional_lang() {
    let url = place_details_url(&base("/v2/place-details"), "k", "51f07a9", Some("fr"));
    assert_eq!(
        url.as_str(),
        "https://api.example.com/v2/place-details?id=51f07a9&apiKey=k&lang=fr"
    );
    let url = place_details_url(&base("/v2/place-details"), "k", "51f07a9", None);
    assert!(url.query_pairs().all(|(name, _)| name != "lang"));
}

#[test]
fn places_url_joins_category_keys_with_commas() {
    let query = PlacesQuery::new(
        vec!["catering.cafe".to_owned(), "catering.bar".to_owned()],
        8,
    );
    let url = places_url(&base("/v2/places"), "k", &query);
    let categories = url
        .query_pairs()
        .find(|(name, _)| name == "categories")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    assert_eq!(categories, "catering.cafe,catering.bar");
    assert_eq!(
        url.query_pairs()
            .find(|(name, _)| name == "limit")
            .map(|(_, v)| v.into_owned())
            .as_deref(),
        Some("8")
    );
    assert_eq!(
        url.query_pairs()
            .find(|(name, _)| name == "offset")
            .map(|(_, v)| v.into_owned())
            .as_deref(),
        Some("0")
    );
}

#[test]
fn places_url_carries_resolved_filter_and_bias() {
    let mut query = PlacesQuery::new(vec!["catering.cafe".to_owned()], 20);
    query.offset = 40;
    query
        .filter
        .insert(FilterValue::Place("p1".to_owned()).kind(), FilterValue::Place("p1".to_owned()));
    query.bias.insert(
        FilterValue::Proximity { lon: 2.3, lat: 48.8 }.kind(),
        FilterValue::Proximity { lon: 2.3, lat: 48.8 },
    );
    let url = places_url(&base("/v2/places"), "k", &query);
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(n, v)| (n.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("offset".to_owned(), "40".to_owned())));
    assert!(pairs.contains(&("filter".to_owned(), "place:p1".to_owned())));
    assert!(pairs.contains(&("bias".to_owned(), "proximity:2.3,48.8".to_owned())));
}

#[test]
fn ip_info_url_has_only_the_key() {
    let url = ip_info_url(&base("/v1/ipinfo"), "k");
    assert_eq!(url.as_str(), "https://api.example.com/v1/ipinfo?apiKey=k");
}
