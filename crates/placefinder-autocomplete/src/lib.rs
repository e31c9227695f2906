//! Headless address/places autocomplete engine.
//!
//! Feed [`Autocomplete`] input-text changes and key events; it debounces,
//! queries the geocoding API, keeps dropdown suggestion state (address rows
//! plus category rows), drives the paginated places list, and notifies
//! subscribers through the typed [`events::Event`] surface. Rendering stays
//! with the host: subscribe to events, or attach render callbacks to the
//! [`places::PlacesList`].
//!
//! Requests of the same kind supersede each other — a stale response can
//! never overwrite state produced by a newer request.

pub mod controller;
pub mod events;
pub mod format;
pub mod hooks;
pub mod places;
pub mod registry;
mod slot;

pub use controller::{Autocomplete, Key, ENHANCED_SOURCE};
pub use events::{ClearKind, Event, EventKind};
pub use format::{AddressFormatter, DefaultFormatter, NonVerifiedExtension, SuggestionEnhancer};
pub use hooks::{
    GeocoderRequestFn, PlaceDetailsRequestFn, PlacesRequestFn, PostprocessHook, PreprocessHook,
    SuggestionsFilter,
};
pub use places::{PlacesCallbacks, PlacesList};
pub use registry::{Callback, CallbackRegistry};
