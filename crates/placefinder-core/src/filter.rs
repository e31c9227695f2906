//! Filter and bias serialization for geocoder request URLs.
//!
//! Both the `filter=` and `bias=` query parameters take a `|`-separated list
//! of per-kind tokens:
//!
//! ```text
//! countrycode:de,fr
//! circle:lon,lat,radiusMeters
//! rect:lon1,lat1,lon2,lat2
//! place:<id>
//! proximity:lon,lat
//! geometry:<id>
//! ```
//!
//! Values that fail validation (latitude outside [-90, 90], longitude outside
//! [-180, 180], non-positive radius, empty code lists) are dropped from the
//! serialized group rather than surfaced as errors; a group with no valid
//! tokens omits the parameter entirely.

use std::collections::BTreeMap;

/// The closed set of filter/bias kinds. At most one value per kind is held in
/// a [`FilterMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKind {
    Circle,
    Rect,
    CountryCodes,
    Place,
    Proximity,
    Geometry,
}

/// A typed filter or bias value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Circle {
        lon: f64,
        lat: f64,
        radius_meters: f64,
    },
    Rect {
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
    },
    /// ISO 3166-1 alpha-2 codes; emitted lowercased.
    CountryCodes(Vec<String>),
    Place(String),
    Proximity {
        lon: f64,
        lat: f64,
    },
    Geometry(String),
}

/// Per-kind filter storage. `BTreeMap` keeps token order deterministic.
pub type FilterMap = BTreeMap<FilterKind, FilterValue>;

fn lat_valid(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

fn lon_valid(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

impl FilterValue {
    /// The kind slot this value occupies.
    #[must_use]
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Circle { .. } => FilterKind::Circle,
            FilterValue::Rect { .. } => FilterKind::Rect,
            FilterValue::CountryCodes(_) => FilterKind::CountryCodes,
            FilterValue::Place(_) => FilterKind::Place,
            FilterValue::Proximity { .. } => FilterKind::Proximity,
            FilterValue::Geometry(_) => FilterKind::Geometry,
        }
    }

    /// Serializes this value into its URL token, or `None` when the value is
    /// invalid and must be dropped.
    #[must_use]
    pub fn to_token(&self) -> Option<String> {
        match self {
            FilterValue::Circle {
                lon,
                lat,
                radius_meters,
            } => {
                if lon_valid(*lon) && lat_valid(*lat) && *radius_meters > 0.0 {
                    Some(format!("circle:{lon},{lat},{radius_meters}"))
                } else {
                    None
                }
            }
            FilterValue::Rect {
                lon1,
                lat1,
                lon2,
                lat2,
            } => {
                if lon_valid(*lon1) && lat_valid(*lat1) && lon_valid(*lon2) && lat_valid(*lat2) {
                    Some(format!("rect:{lon1},{lat1},{lon2},{lat2}"))
                } else {
                    None
                }
            }
            FilterValue::CountryCodes(codes) => {
                let codes: Vec<String> = codes
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_lowercase())
                    .collect();
                if codes.is_empty() {
                    None
                } else {
                    Some(format!("countrycode:{}", codes.join(",")))
                }
            }
            FilterValue::Place(id) => {
                if id.is_empty() {
                    None
                } else {
                    Some(format!("place:{id}"))
                }
            }
            FilterValue::Proximity { lon, lat } => {
                if lon_valid(*lon) && lat_valid(*lat) {
                    Some(format!("proximity:{lon},{lat}"))
                } else {
                    None
                }
            }
            FilterValue::Geometry(id) => {
                if id.is_empty() {
                    None
                } else {
                    Some(format!("geometry:{id}"))
                }
            }
        }
    }
}

/// Serializes a filter map into the `|`-joined parameter value.
///
/// Returns `None` when no entry produces a valid token, in which case the
/// query parameter must be omitted.
#[must_use]
pub fn serialize_group(map: &FilterMap) -> Option<String> {
    let tokens: Vec<String> = map.values().filter_map(FilterValue::to_token).collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join("|"))
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
