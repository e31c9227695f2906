//! HTTP client for the geocoding API.
//!
//! Wraps `reqwest` with typed response deserialization and per-endpoint URL
//! construction. The client performs no retries and knows nothing about
//! request supersession; canceling stale work is the engine's job.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use placefinder_core::config::ApiConfig;
use placefinder_core::feature::{GeocodeResponse, IpInfo, PlaceDetailsResponse, PlacesResponse};
use placefinder_core::options::AutocompleteOptions;

use crate::error::ApiError;
use crate::url::{geocode_url, ip_info_url, place_details_url, places_url, PlacesQuery};

/// Client for the geocoding API endpoints.
///
/// Holds one `reqwest::Client` plus the parsed endpoint URLs. Point the
/// URLs in [`ApiConfig`] at a mock server for tests.
pub struct GeoClient {
    http: Client,
    api_key: String,
    geocode_base: Url,
    details_base: Url,
    places_base: Url,
    ip_base: Url,
}

impl GeoClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if an endpoint URL
    /// does not parse.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            geocode_base: parse_base(&config.geocode_url)?,
            details_base: parse_base(&config.details_url)?,
            places_base: parse_base(&config.places_url)?,
            ip_base: parse_base(&config.ip_url)?,
        })
    }

    /// Fetches address suggestions for a free-text query.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the body does not match the expected shape.
    pub async fn autocomplete(
        &self,
        text: &str,
        options: &AutocompleteOptions,
    ) -> Result<GeocodeResponse, ApiError> {
        let url = geocode_url(&self.geocode_base, &self.api_key, text, options);
        self.request_json(url).await
    }

    /// Fetches enriched details for a place identifier.
    ///
    /// An empty `features` list in the response is not an error; callers fall
    /// back to the feature they already hold.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GeoClient::autocomplete`].
    pub async fn place_details(
        &self,
        place_id: &str,
        lang: Option<&str>,
    ) -> Result<PlaceDetailsResponse, ApiError> {
        let url = place_details_url(&self.details_base, &self.api_key, place_id, lang);
        self.request_json(url).await
    }

    /// Fetches one page of places for a category query.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GeoClient::autocomplete`].
    pub async fn places(&self, query: &PlacesQuery) -> Result<PlacesResponse, ApiError> {
        let url = places_url(&self.places_base, &self.api_key, query);
        self.request_json(url).await
    }

    /// Looks up the caller's approximate location by IP.
    ///
    /// Used only to derive a best-effort proximity bias; callers degrade to
    /// "no bias" on any error.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GeoClient::autocomplete`].
    pub async fn ip_locate(&self) -> Result<IpInfo, ApiError> {
        let url = ip_info_url(&self.ip_base, &self.api_key);
        self.request_json(url).await
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body as JSON.
    async fn request_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %redacted(&url), "non-2xx response");
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: redacted(&url),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: redacted(&url),
            source: e,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// URL rendered for error messages with the API key masked.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    if url.query_pairs().any(|(name, _)| name == "apiKey") {
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != "apiKey")
            .map(|(n, v)| (n.into_owned(), v.into_owned()))
            .collect();
        if retained.is_empty() {
            shown.set_query(None);
        } else {
            shown.query_pairs_mut().clear().extend_pairs(retained);
        }
    }
    shown.to_string()
}
