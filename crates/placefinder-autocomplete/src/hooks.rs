//! Optional host-supplied strategies.
//!
//! Every hook is stored as an `Option` and invoked through a call-if-present
//! guard; the engine never assumes one is set. The request senders replace
//! the built-in client calls wholesale — a custom sender that wants to
//! signal supersession returns [`placefinder_api::ApiError::Canceled`].

use std::sync::Arc;

use futures::future::BoxFuture;

use placefinder_api::{ApiError, PlacesQuery};
use placefinder_core::feature::{Feature, GeocodeResponse, PlaceDetailsResponse, PlacesResponse};

/// Rewrites the raw input text before the geocoder request is built.
pub type PreprocessHook = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Produces the text written into the input when a feature is selected.
pub type PostprocessHook = Arc<dyn Fn(&Feature) -> String + Send + Sync>;

/// Filters or reorders suggestions before they are shown.
pub type SuggestionsFilter = Arc<dyn Fn(Vec<Feature>) -> Vec<Feature> + Send + Sync>;

/// Replaces the built-in geocoder request.
pub type GeocoderRequestFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<GeocodeResponse, ApiError>> + Send + Sync>;

/// Replaces the built-in place-details request.
pub type PlaceDetailsRequestFn =
    Arc<dyn Fn(Feature) -> BoxFuture<'static, Result<PlaceDetailsResponse, ApiError>> + Send + Sync>;

/// Replaces the built-in places request.
pub type PlacesRequestFn =
    Arc<dyn Fn(PlacesQuery) -> BoxFuture<'static, Result<PlacesResponse, ApiError>> + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub preprocess: Option<PreprocessHook>,
    pub postprocess: Option<PostprocessHook>,
    pub suggestions_filter: Option<SuggestionsFilter>,
    pub send_geocoder: Option<GeocoderRequestFn>,
    pub send_place_details: Option<PlaceDetailsRequestFn>,
    pub send_places: Option<PlacesRequestFn>,
}
