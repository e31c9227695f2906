//! Geocoder response types shared by the HTTP layer and the engine.
//!
//! ## Observed response shapes
//!
//! ### Features
//! Every endpoint returns GeoJSON-style `Feature` objects. The property set
//! varies wildly by data source: address results carry `formatted`,
//! `address_line1`/`address_line2` and parsed components; place results add
//! `categories` and sometimes `opening_hours`. Everything we do not model
//! explicitly is preserved in the flattened `extra` map so features stay
//! opaque round-trippable records.
//!
//! ### `rank.match_type`
//! Only present on geocoder results. Observed values include `full_match`,
//! `inner_part`, `match_by_street`, `match_by_postcode`,
//! `match_by_city_or_district`. Partial matches are the trigger for the
//! non-verified address extension in the engine.
//!
//! ### `query`
//! The autocomplete endpoint may attach a `query` object echoing the parsed
//! input and, when the text resembles a place category, a `categories` list.
//! Both are frequently absent; all fields default rather than erroring.

use serde::{Deserialize, Serialize};

/// A single geocoded or place record.
///
/// Treated as immutable by the engine except for the non-verified address
/// extension, which may append synthesized parts to `formatted` and record
/// them in [`FeatureProperties::non_verified_parts`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    /// GeoJSON object type, normally `"Feature"`.
    #[serde(rename = "type", default)]
    pub feature_type: Option<String>,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: FeatureProperties,
}

impl Feature {
    /// Stable identifier used for de-duplication across places pages.
    #[must_use]
    pub fn place_id(&self) -> Option<&str> {
        self.properties.place_id.as_deref()
    }

    /// Whether this feature originates from the named data source.
    #[must_use]
    pub fn is_from_source(&self, sourcename: &str) -> bool {
        self.properties
            .datasource
            .as_ref()
            .and_then(|d| d.sourcename.as_deref())
            == Some(sourcename)
    }
}

/// GeoJSON geometry. Coordinates are kept as raw JSON since the engine never
/// computes with them; hosts hand them to their map layer as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

/// Known feature properties plus an opaque spill-over map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub place_id: Option<String>,

    /// Full display address.
    #[serde(default)]
    pub formatted: Option<String>,

    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,

    /// Display name for POI results.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,

    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub housenumber: Option<String>,

    /// Raw category identifiers for place results. Empty for addresses.
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub datasource: Option<DataSource>,

    #[serde(default)]
    pub rank: Option<Rank>,

    /// Opening hours in OSM syntax, when the source provides them.
    #[serde(default)]
    pub opening_hours: Option<String>,

    /// Parts of the formatted address synthesized locally rather than
    /// returned by the server. Empty for untouched features.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_verified_parts: Vec<String>,

    /// Everything else the server sent, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Provenance of a feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub sourcename: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
}

/// Match quality metadata attached by the geocoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rank {
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Response of the autocomplete geocoder endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub query: Option<QueryInfo>,
}

/// Echo of the query attached to a geocoder response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryInfo {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parsed: Option<ParsedQuery>,
    /// Raw category suggestions; see [`crate::category::extract_categories`].
    #[serde(default)]
    pub categories: Option<Vec<serde_json::Value>>,
}

/// Server-side parse of the free-text query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(default)]
    pub housenumber: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub expected_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of the places endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Response of the place-details endpoint. An empty feature list means the
/// caller should fall back to the feature it already holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Response of the IP geolocation endpoint, used only as a bias fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(default)]
    pub location: Option<IpLocation>,
}

/// Approximate coordinates of the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
}
