//! Request-URL construction for the geocoding API.
//!
//! All query parameters go through [`reqwest::Url::query_pairs_mut`] so values
//! are percent-encoded safely. Filter and bias groups are serialized by
//! [`placefinder_core::filter::serialize_group`]; an empty group omits its
//! parameter entirely.

use reqwest::Url;

use placefinder_core::filter::{serialize_group, FilterMap};
use placefinder_core::options::AutocompleteOptions;

/// Parameters of one places request, with filter/bias precedence already
/// resolved by the caller.
#[derive(Debug, Clone, Default)]
pub struct PlacesQuery {
    /// Raw category keys, comma-joined into the `categories` parameter.
    pub categories: Vec<String>,
    pub limit: u32,
    pub offset: u32,
    pub lang: Option<String>,
    pub filter: FilterMap,
    pub bias: FilterMap,
}

impl PlacesQuery {
    #[must_use]
    pub fn new(categories: Vec<String>, limit: u32) -> Self {
        Self {
            categories,
            limit,
            ..Self::default()
        }
    }
}

/// Builds the autocomplete geocoder URL for a free-text query.
#[must_use]
pub fn geocode_url(
    base: &Url,
    api_key: &str,
    text: &str,
    options: &AutocompleteOptions,
) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("text", text);
        pairs.append_pair("apiKey", api_key);
        if let Some(search_type) = options.search_type {
            pairs.append_pair("type", search_type.as_str());
        }
        if let Some(limit) = options.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(lang) = &options.lang {
            pairs.append_pair("lang", lang);
        }
        if let Some(filter) = serialize_group(&options.address_filters) {
            pairs.append_pair("filter", &filter);
        }
        if let Some(bias) = serialize_group(&options.address_bias) {
            pairs.append_pair("bias", &bias);
        }
    }
    url
}

/// Builds the place-details URL for a place identifier.
#[must_use]
pub fn place_details_url(base: &Url, api_key: &str, place_id: &str, lang: Option<&str>) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("id", place_id);
        pairs.append_pair("apiKey", api_key);
        if let Some(lang) = lang {
            pairs.append_pair("lang", lang);
        }
    }
    url
}

/// Builds the places URL for a category query page.
#[must_use]
pub fn places_url(base: &Url, api_key: &str, query: &PlacesQuery) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("categories", &query.categories.join(","));
        pairs.append_pair("apiKey", api_key);
        if let Some(lang) = &query.lang {
            pairs.append_pair("lang", lang);
        }
        pairs.append_pair("limit", &query.limit.to_string());
        pairs.append_pair("offset", &query.offset.to_string());
        if let Some(filter) = serialize_group(&query.filter) {
            pairs.append_pair("filter", &filter);
        }
        if let Some(bias) = serialize_group(&query.bias) {
            pairs.append_pair("bias", &bias);
        }
    }
    url
}

/// Builds the IP geolocation URL.
#[must_use]
pub fn ip_info_url(base: &Url, api_key: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("apiKey", api_key);
    url
}

#[cfg(test)]
#[path = "url_test.rs"]
mod tests;
