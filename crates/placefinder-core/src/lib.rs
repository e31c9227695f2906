//! Data model and configuration for the placefinder autocomplete engine.
//!
//! This crate holds everything the HTTP layer and the orchestration engine
//! share: geocoder feature/response types, the filter/bias token grammar,
//! category normalization and state, the per-instance options struct, and
//! the env-driven API configuration.

pub mod category;
pub mod config;
pub mod error;
pub mod feature;
pub mod filter;
pub mod options;

pub use category::{extract_categories, Category, CategoryState};
pub use config::ApiConfig;
pub use error::ConfigError;
pub use feature::{
    DataSource, Feature, FeatureProperties, GeocodeResponse, Geometry, IpInfo, IpLocation,
    ParsedQuery, PlaceDetailsResponse, PlacesResponse, QueryInfo, Rank,
};
pub use filter::{serialize_group, FilterKind, FilterMap, FilterValue};
pub use options::{AutocompleteOptions, SearchType};
