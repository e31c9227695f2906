//! HTTP surface of the placefinder engine.
//!
//! [`GeoClient`] wraps `reqwest` for the four endpoints the engine talks to
//! (autocomplete geocoder, place details, places, IP geolocation); the `url`
//! module holds the pure request-URL construction the client and tests share.

pub mod client;
pub mod error;
pub mod url;

pub use client::GeoClient;
pub use error::ApiError;
pub use url::PlacesQuery;
