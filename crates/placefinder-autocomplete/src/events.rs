//! The engine's lifecycle event surface.
//!
//! Events form a closed enumeration so listeners can match exhaustively;
//! there are no string-keyed channels. Payloads carry owned data — a
//! listener may stash them without borrowing engine state.

use placefinder_core::feature::{Feature, GeocodeResponse};

/// What a `Clear` event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearKind {
    Category,
    Address,
    Place,
}

/// A lifecycle notification from the engine.
#[derive(Debug, Clone)]
pub enum Event {
    /// A value was confirmed (click, Enter, eager arrow selection, or a
    /// clear with `None`), after any place-details enrichment.
    Select(Option<Feature>),
    /// Fresh address suggestions arrived for the given query.
    Suggestions {
        query: String,
        features: Vec<Feature>,
    },
    /// The input text changed through a keystroke.
    Input(String),
    /// The suggestion dropdown opened.
    Open,
    /// The suggestion dropdown closed.
    Close,
    /// A geocoder request is about to be sent.
    RequestStart { query: String },
    /// A geocoder request finished.
    RequestEnd {
        success: bool,
        response: Option<GeocodeResponse>,
        error: Option<String>,
    },
    /// A places page arrived.
    Places(Vec<Feature>),
    PlacesRequestStart,
    PlacesRequestEnd {
        success: bool,
        features: Option<Vec<Feature>>,
        error: Option<String>,
    },
    PlaceDetailsRequestStart(Box<Feature>),
    PlaceDetailsRequestEnd {
        success: bool,
        feature: Option<Box<Feature>>,
        error: Option<String>,
    },
    /// A row in the places list was marked (or unmarked) as selected.
    PlaceSelect(Option<Feature>),
    /// Input, category, or place state was cleared.
    Clear(ClearKind),
}

/// Channel identifiers for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Select,
    Suggestions,
    Input,
    Open,
    Close,
    RequestStart,
    RequestEnd,
    Places,
    PlacesRequestStart,
    PlacesRequestEnd,
    PlaceDetailsRequestStart,
    PlaceDetailsRequestEnd,
    PlaceSelect,
    Clear,
}

impl Event {
    /// The channel this event is delivered on.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Select(_) => EventKind::Select,
            Event::Suggestions { .. } => EventKind::Suggestions,
            Event::Input(_) => EventKind::Input,
            Event::Open => EventKind::Open,
            Event::Close => EventKind::Close,
            Event::RequestStart { .. } => EventKind::RequestStart,
            Event::RequestEnd { .. } => EventKind::RequestEnd,
            Event::Places(_) => EventKind::Places,
            Event::PlacesRequestStart => EventKind::PlacesRequestStart,
            Event::PlacesRequestEnd { .. } => EventKind::PlacesRequestEnd,
            Event::PlaceDetailsRequestStart(_) => EventKind::PlaceDetailsRequestStart,
            Event::PlaceDetailsRequestEnd { .. } => EventKind::PlaceDetailsRequestEnd,
            Event::PlaceSelect(_) => EventKind::PlaceSelect,
            Event::Clear(_) => EventKind::Clear,
        }
    }
}
