//! Display formatting and the non-verified address extension.
//!
//! Both are injectable strategies: the engine's control flow only decides
//! *when* they run, never *how* an address is spelled.

use std::collections::HashSet;

use placefinder_core::feature::{Feature, ParsedQuery};
use placefinder_core::options::AutocompleteOptions;

/// Produces the display text for a feature, used when a selected row is
/// written into the input.
pub trait AddressFormatter: Send + Sync {
    fn display_text(&self, feature: &Feature) -> String;
}

/// `formatted`, falling back to `address_line1`, then the POI name.
#[derive(Debug, Default)]
pub struct DefaultFormatter;

impl AddressFormatter for DefaultFormatter {
    fn display_text(&self, feature: &Feature) -> String {
        let properties = &feature.properties;
        properties
            .formatted
            .clone()
            .or_else(|| properties.address_line1.clone())
            .or_else(|| properties.name.clone())
            .unwrap_or_default()
    }
}

/// Synthesizes address parts the server parsed from the query but could not
/// verify, marking them in `non_verified_parts`.
pub trait SuggestionEnhancer: Send + Sync {
    fn enhance(&self, feature: &mut Feature, parsed: &ParsedQuery, options: &AutocompleteOptions);
}

/// Match types that justify synthesizing a house number onto a street-level
/// result.
const HOUSE_NUMBER_MATCH_TYPES: [&str; 2] = ["match_by_street", "match_by_postcode"];

/// Match types that justify synthesizing a street onto a city-level result.
const STREET_MATCH_TYPES: [&str; 2] = ["match_by_city_or_district", "match_by_postcode"];

/// Data-driven extension: whether the house number precedes the street is a
/// per-country convention; everything not listed uses the street-first
/// fallback.
pub struct NonVerifiedExtension {
    house_number_first: HashSet<String>,
}

impl Default for NonVerifiedExtension {
    fn default() -> Self {
        let house_number_first = ["us", "gb", "ie", "ca", "au", "nz", "fr"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        Self { house_number_first }
    }
}

impl NonVerifiedExtension {
    /// Overrides the set of countries where the house number comes first.
    #[must_use]
    pub fn with_house_number_first<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            house_number_first: countries
                .into_iter()
                .map(|c| c.into().to_lowercase())
                .collect(),
        }
    }

    fn combine(&self, country_code: Option<&str>, number: &str, street: &str) -> String {
        let number_first = country_code
            .is_some_and(|code| self.house_number_first.contains(&code.to_lowercase()));
        if number_first {
            format!("{number} {street}")
        } else {
            format!("{street} {number}")
        }
    }
}

impl SuggestionEnhancer for NonVerifiedExtension {
    fn enhance(&self, feature: &mut Feature, parsed: &ParsedQuery, options: &AutocompleteOptions) {
        let Some(match_type) = feature
            .properties
            .rank
            .as_ref()
            .and_then(|r| r.match_type.as_deref())
            .map(str::to_owned)
        else {
            return;
        };

        if options.add_non_verified_street
            && STREET_MATCH_TYPES.contains(&match_type.as_str())
            && feature.properties.street.is_none()
        {
            if let Some(street) = parsed.street.clone() {
                let formatted = feature.properties.formatted.take();
                feature.properties.formatted = Some(match formatted {
                    Some(rest) => format!("{street}, {rest}"),
                    None => street.clone(),
                });
                feature.properties.street = Some(street);
                feature
                    .properties
                    .non_verified_parts
                    .push("street".to_owned());
            }
        }

        if options.add_non_verified_house_number
            && HOUSE_NUMBER_MATCH_TYPES.contains(&match_type.as_str())
            && feature.properties.housenumber.is_none()
        {
            let street = feature.properties.street.clone();
            if let (Some(number), Some(street)) = (parsed.housenumber.clone(), street) {
                let combined = self.combine(
                    feature.properties.country_code.as_deref(),
                    &number,
                    &street,
                );
                feature.properties.formatted = Some(match feature.properties.formatted.take() {
                    Some(formatted) if formatted.contains(&street) => {
                        formatted.replacen(&street, &combined, 1)
                    }
                    Some(formatted) => format!("{combined}, {formatted}"),
                    None => combined,
                });
                feature.properties.housenumber = Some(number);
                feature
                    .properties
                    .non_verified_parts
                    .push("housenumber".to_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn street_match_feature(country: &str) -> Feature {
        serde_json::from_value(serde_json::json!({
            "properties": {
                "formatted": "Hauptstraße, 10115 Berlin",
                "street": "Hauptstraße",
                "country_code": country,
                "rank": { "match_type": "match_by_street" }
            }
        }))
        .unwrap()
    }

    fn parsed_with_housenumber(number: &str) -> ParsedQuery {
        serde_json::from_value(serde_json::json!({ "housenumber": number })).unwrap()
    }

    fn allowing_options() -> AutocompleteOptions {
        AutocompleteOptions::new()
            .with_add_non_verified_house_number(true)
            .with_add_non_verified_street(true)
    }

    #[test]
    fn synthesizes_house_number_after_street_by_default() {
        let mut feature = street_match_feature("de");
        NonVerifiedExtension::default().enhance(
            &mut feature,
            &parsed_with_housenumber("12"),
            &allowing_options(),
        );
        assert_eq!(
            feature.properties.formatted.as_deref(),
            Some("Hauptstraße 12, 10115 Berlin")
        );
        assert_eq!(feature.properties.housenumber.as_deref(), Some("12"));
        assert_eq!(feature.properties.non_verified_parts, vec!["housenumber"]);
    }

    #[test]
    fn house_number_precedes_street_for_listed_countries() {
        let mut feature = street_match_feature("us");
        NonVerifiedExtension::default().enhance(
            &mut feature,
            &parsed_with_housenumber("12"),
            &allowing_options(),
        );
        assert_eq!(
            feature.properties.formatted.as_deref(),
            Some("12 Hauptstraße, 10115 Berlin")
        );
    }

    #[test]
    fn does_nothing_when_options_disallow() {
        let mut feature = street_match_feature("de");
        NonVerifiedExtension::default().enhance(
            &mut feature,
            &parsed_with_housenumber("12"),
            &AutocompleteOptions::default(),
        );
        assert_eq!(
            feature.properties.formatted.as_deref(),
            Some("Hauptstraße, 10115 Berlin")
        );
        assert!(feature.properties.non_verified_parts.is_empty());
    }

    #[test]
    fn does_nothing_on_full_match() {
        let mut feature: Feature = serde_json::from_value(serde_json::json!({
            "properties": {
                "formatted": "Hauptstraße 7, Berlin",
                "street": "Hauptstraße",
                "housenumber": "7",
                "rank": { "match_type": "full_match" }
            }
        }))
        .unwrap();
        NonVerifiedExtension::default().enhance(
            &mut feature,
            &parsed_with_housenumber("12"),
            &allowing_options(),
        );
        assert_eq!(feature.properties.housenumber.as_deref(), Some("7"));
        assert!(feature.properties.non_verified_parts.is_empty());
    }

    #[test]
    fn synthesizes_street_onto_city_level_match() {
        let mut feature: Feature = serde_json::from_value(serde_json::json!({
            "properties": {
                "formatted": "10115 Berlin",
                "rank": { "match_type": "match_by_city_or_district" }
            }
        }))
        .unwrap();
        let parsed: ParsedQuery =
            serde_json::from_value(serde_json::json!({ "street": "Invalidenstraße" })).unwrap();
        NonVerifiedExtension::default().enhance(&mut feature, &parsed, &allowing_options());
        assert_eq!(
            feature.properties.formatted.as_deref(),
            Some("Invalidenstraße, 10115 Berlin")
        );
        assert_eq!(feature.properties.non_verified_parts, vec!["street"]);
    }

    #[test]
    fn default_formatter_falls_back_through_fields() {
        let feature: Feature = serde_json::from_value(serde_json::json!({
            "properties": { "name": "Cafe Einstein" }
        }))
        .unwrap();
        assert_eq!(DefaultFormatter.display_text(&feature), "Cafe Einstein");

        let feature: Feature = serde_json::from_value(serde_json::json!({
            "properties": { "formatted": "Unter den Linden 42", "name": "x" }
        }))
        .unwrap();
        assert_eq!(DefaultFormatter.display_text(&feature), "Unter den Linden 42");
    }
}
