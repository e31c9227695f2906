//! Per-instance engine options.
//!
//! One `AutocompleteOptions` value is owned by one engine instance and passed
//! by reference to collaborators; there is no process-wide option state.
//! Address filter/bias and places filter/bias are four distinct maps — the
//! two request families never share geography constraints implicitly.

use std::time::Duration;

use crate::filter::{FilterMap, FilterValue};

/// Default keystroke debounce.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default page size for places requests.
pub const DEFAULT_PLACES_LIMIT: u32 = 20;

/// Location type restriction for address search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Country,
    State,
    City,
    Postcode,
    Street,
    Amenity,
}

impl SearchType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Country => "country",
            SearchType::State => "state",
            SearchType::City => "city",
            SearchType::Postcode => "postcode",
            SearchType::Street => "street",
            SearchType::Amenity => "amenity",
        }
    }
}

/// Long-lived configuration for one engine instance.
#[derive(Debug, Clone)]
pub struct AutocompleteOptions {
    /// Restrict address results to one location type.
    pub search_type: Option<SearchType>,
    /// Result language (2-letter ISO 639-1 code).
    pub lang: Option<String>,
    /// Maximum number of address suggestions per request.
    pub limit: Option<u32>,
    /// Keystroke debounce before the geocoder request fires.
    pub debounce_delay: Duration,
    /// Page size for places requests; also the end-of-results signal
    /// (a short page means no further pages).
    pub places_limit: u32,

    /// Skip icon rendering hints in list items.
    pub skip_icons: bool,
    /// Arrow keys move focus without writing the row value into the input.
    pub skip_selection_on_arrow_key: bool,
    /// Maintain the places results list when a category is active.
    pub show_places_list: bool,
    /// Trigger load-more from scroll proximity instead of an explicit button.
    pub lazy_load_places: bool,
    /// Allow synthesizing a house number the server did not verify.
    pub add_non_verified_house_number: bool,
    /// Allow synthesizing a street the server did not verify.
    pub add_non_verified_street: bool,
    /// Emit `select` directly without the place-details round trip.
    pub skip_place_details: bool,

    pub address_filters: FilterMap,
    pub address_bias: FilterMap,
    pub places_filters: FilterMap,
    pub places_bias: FilterMap,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            search_type: None,
            lang: None,
            limit: None,
            debounce_delay: DEFAULT_DEBOUNCE,
            places_limit: DEFAULT_PLACES_LIMIT,
            skip_icons: false,
            skip_selection_on_arrow_key: false,
            show_places_list: true,
            lazy_load_places: true,
            add_non_verified_house_number: false,
            add_non_verified_street: false,
            skip_place_details: false,
            address_filters: FilterMap::new(),
            address_bias: FilterMap::new(),
            places_filters: FilterMap::new(),
            places_bias: FilterMap::new(),
        }
    }
}

impl AutocompleteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    #[must_use]
    pub fn with_places_limit(mut self, limit: u32) -> Self {
        self.places_limit = limit;
        self
    }

    #[must_use]
    pub fn with_skip_icons(mut self, skip: bool) -> Self {
        self.skip_icons = skip;
        self
    }

    #[must_use]
    pub fn with_skip_selection_on_arrow_key(mut self, skip: bool) -> Self {
        self.skip_selection_on_arrow_key = skip;
        self
    }

    #[must_use]
    pub fn with_show_places_list(mut self, show: bool) -> Self {
        self.show_places_list = show;
        self
    }

    #[must_use]
    pub fn with_lazy_load_places(mut self, lazy: bool) -> Self {
        self.lazy_load_places = lazy;
        self
    }

    #[must_use]
    pub fn with_add_non_verified_house_number(mut self, allow: bool) -> Self {
        self.add_non_verified_house_number = allow;
        self
    }

    #[must_use]
    pub fn with_add_non_verified_street(mut self, allow: bool) -> Self {
        self.add_non_verified_street = allow;
        self
    }

    #[must_use]
    pub fn with_skip_place_details(mut self, skip: bool) -> Self {
        self.skip_place_details = skip;
        self
    }

    /// Adds or replaces the address filter of the value's kind.
    pub fn add_address_filter(&mut self, value: FilterValue) {
        self.address_filters.insert(value.kind(), value);
    }

    /// Adds or replaces the address bias of the value's kind.
    pub fn add_address_bias(&mut self, value: FilterValue) {
        self.address_bias.insert(value.kind(), value);
    }

    /// Adds or replaces the places filter of the value's kind.
    pub fn add_places_filter(&mut self, value: FilterValue) {
        self.places_filters.insert(value.kind(), value);
    }

    /// Adds or replaces the places bias of the value's kind.
    pub fn add_places_bias(&mut self, value: FilterValue) {
        self.places_bias.insert(value.kind(), value);
    }

    #[must_use]
    pub fn with_address_filter(mut self, value: FilterValue) -> Self {
        self.add_address_filter(value);
        self
    }

    #[must_use]
    pub fn with_address_bias(mut self, value: FilterValue) -> Self {
        self.add_address_bias(value);
        self
    }

    #[must_use]
    pub fn with_places_filter(mut self, value: FilterValue) -> Self {
        self.add_places_filter(value);
        self
    }

    #[must_use]
    pub fn with_places_bias(mut self, value: FilterValue) -> Self {
        self.add_places_bias(value);
        self
    }
}
