//! The request orchestrator: debounced geocoder lifecycle, dropdown state,
//! category mode, keyboard navigation, and the value-selected pipeline.
//!
//! All mutable state sits behind one mutex that is only held for short
//! synchronous sections — never across an `.await` and never while listener
//! callbacks run. Async work (the debounce sleep and the network futures)
//! lives in spawned tasks that re-acquire the lock to commit, gated by the
//! generation check in [`RequestSlot`]: a completion whose generation was
//! superseded drops its result silently.
//!
//! Public methods spawn onto the ambient Tokio runtime and therefore must be
//! called from within one. None of them returns an error: failures become a
//! `tracing` warning plus the matching `*RequestEnd { success: false }`
//! event (cancellations not even that).

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::time::Instant;

use placefinder_api::{ApiError, GeoClient, PlacesQuery};
use placefinder_core::category::{extract_categories, Category, CategoryState};
use placefinder_core::config::ApiConfig;
use placefinder_core::feature::Feature;
use placefinder_core::filter::{FilterKind, FilterMap, FilterValue};
use placefinder_core::options::{AutocompleteOptions, SearchType};

use crate::events::{ClearKind, Event, EventKind};
use crate::format::{AddressFormatter, DefaultFormatter, NonVerifiedExtension, SuggestionEnhancer};
use crate::hooks::{
    GeocoderRequestFn, Hooks, PlaceDetailsRequestFn, PlacesRequestFn, PostprocessHook,
    PreprocessHook, SuggestionsFilter,
};
use crate::places::{PlaceSelectFn, PlacesList, PlacesUpdateFn};
use crate::registry::{Callback, CallbackRegistry};
use crate::slot::RequestSlot;

/// Second Escape press within this window clears an active category.
const ESCAPE_DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(500);

/// Data source whose features can be enriched by the place-details endpoint.
pub const ENHANCED_SOURCE: &str = "openstreetmap";

/// Keys the engine reacts to. Everything else is an input-text change and
/// goes through [`Autocomplete::handle_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

struct Inner {
    options: AutocompleteOptions,
    hooks: Hooks,
    formatter: Arc<dyn AddressFormatter>,
    enhancer: Arc<dyn SuggestionEnhancer>,
    value: String,
    items: Vec<Feature>,
    categories: Vec<Category>,
    dropdown_open: bool,
    focused: Option<usize>,
    category: CategoryState,
    last_escape: Option<Instant>,
    geocoder: RequestSlot,
    details: RequestSlot,
    places_req: RequestSlot,
}

struct Shared {
    client: GeoClient,
    registry: CallbackRegistry,
    places: PlacesList,
    inner: Mutex<Inner>,
}

/// The autocomplete engine.
///
/// Cheap to clone; clones share all state. Feed it input changes and key
/// events, subscribe through [`Autocomplete::on`], and render from the
/// event payloads.
#[derive(Clone)]
pub struct Autocomplete {
    shared: Arc<Shared>,
}

/// Work that must happen after the state lock is released.
enum FollowUp {
    None,
    ReplayInput(String),
    ValueSelected(Feature),
    CategorySelected(Category),
}

impl Autocomplete {
    /// Creates an engine around an existing client.
    #[must_use]
    pub fn new(client: GeoClient, options: AutocompleteOptions) -> Self {
        let places_limit = options.places_limit;
        let lazy_load = options.lazy_load_places;
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let places = PlacesList::new(places_limit, lazy_load);
            let weak = weak.clone();
            places.set_on_load_more(Some(Arc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::spawn_places_request(&shared, true, None, None);
                }
            })));
            Shared {
                client,
                registry: CallbackRegistry::new(),
                places,
                inner: Mutex::new(Inner {
                    options,
                    hooks: Hooks::default(),
                    formatter: Arc::new(DefaultFormatter),
                    enhancer: Arc::new(NonVerifiedExtension::default()),
                    value: String::new(),
                    items: Vec::new(),
                    categories: Vec::new(),
                    dropdown_open: false,
                    focused: None,
                    category: CategoryState::default(),
                    last_escape: None,
                    geocoder: RequestSlot::default(),
                    details: RequestSlot::default(),
                    places_req: RequestSlot::default(),
                }),
            }
        });
        Self { shared }
    }

    /// Creates an engine and its client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the client cannot be constructed from the
    /// configuration (bad endpoint URL, TLS setup failure).
    pub fn from_config(
        config: &ApiConfig,
        options: AutocompleteOptions,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(GeoClient::new(config)?, options))
    }

    // ---- event surface -------------------------------------------------

    pub fn on(&self, kind: EventKind, callback: Callback) {
        self.shared.registry.on(kind, callback);
    }

    pub fn once(&self, kind: EventKind, callback: Callback) {
        self.shared.registry.once(kind, callback);
    }

    pub fn off(&self, kind: EventKind, callback: Option<&Callback>) {
        self.shared.registry.off(kind, callback);
    }

    // ---- input lifecycle -----------------------------------------------

    /// A keystroke changed the input text.
    ///
    /// Cancels the pending debounce and any in-flight geocoder request,
    /// leaves category mode, closes the dropdown, and — for non-empty
    /// text — arms a fresh debounce timer that will issue the request.
    pub fn handle_input(&self, text: &str) {
        let shared = &self.shared;
        let mut events = Vec::new();
        let (token, delay, had_category) = {
            let mut inner = shared.lock();
            inner.value = text.to_owned();
            let token = inner.geocoder.begin();
            let had_category = inner.category.is_active();
            if had_category {
                inner.category.clear();
                inner.places_req.cancel();
                events.push(Event::Clear(ClearKind::Category));
            }
            if inner.dropdown_open {
                inner.dropdown_open = false;
                events.push(Event::Close);
            }
            inner.focused = None;
            events.push(Event::Input(text.to_owned()));
            (token, inner.options.debounce_delay, had_category)
        };
        if had_category {
            shared.places.reset_category();
        }
        for event in &events {
            shared.registry.emit(event);
        }

        if text.is_empty() {
            return;
        }

        let task_shared = Arc::clone(shared);
        let raw = text.to_owned();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Shared::run_geocoder(&task_shared, token, raw).await;
        });
        shared.lock().geocoder.attach(token, handle);
    }

    /// A navigation/confirmation key was pressed.
    pub fn handle_key(&self, key: Key) {
        match key {
            Key::ArrowDown => self.move_focus(1),
            Key::ArrowUp => self.move_focus(-1),
            Key::Enter => self.confirm_focused(),
            Key::Escape => self.handle_escape(),
        }
    }

    /// The clear button was clicked.
    ///
    /// Cancels pending geocoder/debounce/places work, closes the dropdown,
    /// clears category or address state, and pushes `Select(None)` through
    /// the value-selected pipeline so consumers can reset derived state.
    pub fn clear(&self) {
        let shared = &self.shared;
        let mut events = Vec::new();
        let had_category = {
            let mut inner = shared.lock();
            inner.geocoder.cancel();
            inner.places_req.cancel();
            if inner.dropdown_open {
                inner.dropdown_open = false;
                events.push(Event::Close);
            }
            inner.value.clear();
            inner.items.clear();
            inner.categories.clear();
            inner.focused = None;
            let had_category = inner.category.is_active();
            if had_category {
                inner.category.clear();
                events.push(Event::Clear(ClearKind::Category));
            } else {
                events.push(Event::Clear(ClearKind::Address));
            }
            had_category
        };
        if had_category {
            shared.places.reset_category();
        } else {
            shared.places.clear_places_list();
        }
        for event in &events {
            shared.registry.emit(event);
        }
        Shared::run_value_selected(shared, None);
    }

    /// A dropdown row was clicked. The index space is linear: category rows
    /// first, address rows after.
    pub fn click_item(&self, index: usize) {
        self.select_item(index);
    }

    // ---- dropdown ------------------------------------------------------

    /// Re-opens the dropdown over the current suggestion set, when there is
    /// one.
    pub fn open(&self) {
        let shared = &self.shared;
        let opened = {
            let mut inner = shared.lock();
            if !inner.dropdown_open && !(inner.items.is_empty() && inner.categories.is_empty()) {
                inner.dropdown_open = true;
                true
            } else {
                false
            }
        };
        if opened {
            shared.registry.emit(&Event::Open);
        }
    }

    pub fn close(&self) {
        let shared = &self.shared;
        let closed = {
            let mut inner = shared.lock();
            if inner.dropdown_open {
                inner.dropdown_open = false;
                inner.focused = None;
                true
            } else {
                false
            }
        };
        if closed {
            shared.registry.emit(&Event::Close);
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.lock().dropdown_open
    }

    #[must_use]
    pub fn get_value(&self) -> String {
        self.shared.lock().value.clone()
    }

    /// Sets the input text programmatically, without debounce or request.
    pub fn set_value(&self, text: impl Into<String>) {
        self.shared.lock().value = text.into();
    }

    #[must_use]
    pub fn current_items(&self) -> Vec<Feature> {
        self.shared.lock().items.clone()
    }

    #[must_use]
    pub fn current_categories(&self) -> Vec<Category> {
        self.shared.lock().categories.clone()
    }

    #[must_use]
    pub fn focused_index(&self) -> Option<usize> {
        self.shared.lock().focused
    }

    // ---- category mode -------------------------------------------------

    /// Activates category mode and issues a places request at offset zero.
    pub fn select_category(&self, category: impl Into<Category>) {
        let category = category.into();
        let shared = &self.shared;
        let mut events = Vec::new();
        {
            let mut inner = shared.lock();
            inner.category.set(Some(category.clone()));
            inner.value = category.label.clone();
            if inner.dropdown_open {
                inner.dropdown_open = false;
                events.push(Event::Close);
            }
            inner.focused = None;
        }
        for event in &events {
            shared.registry.emit(event);
        }
        shared.places.set_category(category);
        Shared::spawn_places_request(shared, false, None, None);
    }

    /// Leaves category mode, cancels any in-flight places request, and
    /// resets the places list.
    pub fn clear_category(&self) {
        let shared = &self.shared;
        let was_active = {
            let mut inner = shared.lock();
            let was_active = inner.category.is_active();
            if was_active {
                inner.category.clear();
                inner.places_req.cancel();
            }
            was_active
        };
        if was_active {
            shared.places.reset_category();
            shared.registry.emit(&Event::Clear(ClearKind::Category));
        }
    }

    #[must_use]
    pub fn get_category(&self) -> Option<Category> {
        self.shared.lock().category.get().cloned()
    }

    // ---- places list ---------------------------------------------------

    /// Fetches the first places page for the active category.
    pub fn send_places_request(&self) {
        Shared::spawn_places_request(&self.shared, false, None, None);
    }

    /// Fetches the first places page with an explicit filter/bias override,
    /// which takes precedence over the configured options.
    pub fn send_places_request_with(&self, filter: Option<FilterMap>, bias: Option<FilterMap>) {
        Shared::spawn_places_request(&self.shared, false, filter, bias);
    }

    /// Replays the places request. With `append`, the list's load-more
    /// guards apply and the next page is appended; otherwise the first page
    /// is re-fetched and the list re-rendered from scratch.
    pub fn resend_places_request_for_more(&self, append: bool) {
        if append {
            let _ = self.shared.places.request_more();
        } else {
            self.shared.places.set_current_offset(0);
            Shared::spawn_places_request(&self.shared, false, None, None);
        }
    }

    /// Highlights a places-list row (or clears the highlight with `None`).
    pub fn select_place(&self, index: Option<usize>) {
        if !self.shared.lock().options.show_places_list {
            tracing::warn!("select_place ignored: the places list is disabled");
            return;
        }
        let feature = self.shared.places.select_place(index);
        self.shared.registry.emit(&Event::PlaceSelect(feature));
    }

    /// Scroll position of the places list container changed; may trigger a
    /// lazy load-more.
    pub fn notify_places_scroll(
        &self,
        scroll_top: f64,
        viewport_height: f64,
        content_height: f64,
    ) {
        let _ = self
            .shared
            .places
            .notify_scroll(scroll_top, viewport_height, content_height);
    }

    /// Direct access to the places list for hosts that render it.
    #[must_use]
    pub fn places_list(&self) -> &PlacesList {
        &self.shared.places
    }

    pub fn set_on_places_update(&self, callback: Option<PlacesUpdateFn>) {
        self.shared.places.set_on_places_update(callback);
    }

    pub fn set_on_place_select(&self, callback: Option<PlaceSelectFn>) {
        self.shared.places.set_on_place_select(callback);
    }

    // ---- option setters ------------------------------------------------

    pub fn set_type(&self, search_type: Option<SearchType>) -> &Self {
        self.shared.lock().options.search_type = search_type;
        self
    }

    pub fn set_lang(&self, lang: Option<String>) -> &Self {
        self.shared.lock().options.lang = lang;
        self
    }

    pub fn set_limit(&self, limit: Option<u32>) -> &Self {
        self.shared.lock().options.limit = limit;
        self
    }

    pub fn set_debounce_delay(&self, delay: Duration) -> &Self {
        self.shared.lock().options.debounce_delay = delay;
        self
    }

    pub fn set_places_limit(&self, limit: u32) -> &Self {
        self.shared.lock().options.places_limit = limit;
        self.shared.places.set_page_limit(limit);
        self
    }

    pub fn set_skip_icons(&self, skip: bool) -> &Self {
        self.shared.lock().options.skip_icons = skip;
        self
    }

    pub fn set_skip_selection_on_arrow_key(&self, skip: bool) -> &Self {
        self.shared.lock().options.skip_selection_on_arrow_key = skip;
        self
    }

    pub fn set_show_places_list(&self, show: bool) -> &Self {
        self.shared.lock().options.show_places_list = show;
        self
    }

    pub fn set_lazy_load_places(&self, lazy: bool) -> &Self {
        self.shared.lock().options.lazy_load_places = lazy;
        self.shared.places.set_lazy_load(lazy);
        self
    }

    pub fn set_add_non_verified_house_number(&self, allow: bool) -> &Self {
        self.shared.lock().options.add_non_verified_house_number = allow;
        self
    }

    pub fn set_add_non_verified_street(&self, allow: bool) -> &Self {
        self.shared.lock().options.add_non_verified_street = allow;
        self
    }

    pub fn set_skip_place_details(&self, skip: bool) -> &Self {
        self.shared.lock().options.skip_place_details = skip;
        self
    }

    pub fn add_address_filter(&self, value: FilterValue) -> &Self {
        self.shared.lock().options.add_address_filter(value);
        self
    }

    pub fn add_address_bias(&self, value: FilterValue) -> &Self {
        self.shared.lock().options.add_address_bias(value);
        self
    }

    pub fn add_places_filter(&self, value: FilterValue) -> &Self {
        self.shared.lock().options.add_places_filter(value);
        self
    }

    pub fn add_places_bias(&self, value: FilterValue) -> &Self {
        self.shared.lock().options.add_places_bias(value);
        self
    }

    // ---- hook setters --------------------------------------------------

    pub fn set_preprocess_hook(&self, hook: Option<PreprocessHook>) {
        self.shared.lock().hooks.preprocess = hook;
    }

    pub fn set_postprocess_hook(&self, hook: Option<PostprocessHook>) {
        self.shared.lock().hooks.postprocess = hook;
    }

    pub fn set_suggestions_filter(&self, filter: Option<SuggestionsFilter>) {
        self.shared.lock().hooks.suggestions_filter = filter;
    }

    pub fn set_send_geocoder_request_func(&self, func: Option<GeocoderRequestFn>) {
        self.shared.lock().hooks.send_geocoder = func;
    }

    pub fn set_send_place_details_request_func(&self, func: Option<PlaceDetailsRequestFn>) {
        self.shared.lock().hooks.send_place_details = func;
    }

    pub fn set_send_places_request_func(&self, func: Option<PlacesRequestFn>) {
        self.shared.lock().hooks.send_places = func;
    }

    pub fn set_address_formatter(&self, formatter: Arc<dyn AddressFormatter>) {
        self.shared.lock().formatter = formatter;
    }

    pub fn set_suggestion_enhancer(&self, enhancer: Arc<dyn SuggestionEnhancer>) {
        self.shared.lock().enhancer = enhancer;
    }

    // ---- internals -----------------------------------------------------

    fn move_focus(&self, delta: i32) {
        let shared = &self.shared;
        let mut follow_up = FollowUp::None;
        {
            let mut inner = shared.lock();
            if !inner.dropdown_open {
                // ArrowDown with a closed dropdown replays the current value
                // through the normal input-change path.
                if delta > 0 && !inner.value.is_empty() {
                    follow_up = FollowUp::ReplayInput(inner.value.clone());
                }
            } else {
                let split = inner.categories.len();
                let total = split + inner.items.len();
                if total > 0 {
                    let next = match inner.focused {
                        Some(current) if delta > 0 => (current + 1) % total,
                        Some(current) => (current + total - 1) % total,
                        None if delta > 0 => 0,
                        None => total - 1,
                    };
                    inner.focused = Some(next);
                    if !inner.options.skip_selection_on_arrow_key {
                        if next < split {
                            inner.value = inner.categories[next].label.clone();
                        } else {
                            let feature = inner.items[next - split].clone();
                            inner.value = Self::display_text(&inner, &feature);
                            follow_up = FollowUp::ValueSelected(feature);
                        }
                    }
                }
            }
        }
        match follow_up {
            FollowUp::None | FollowUp::CategorySelected(_) => {}
            FollowUp::ReplayInput(value) => self.handle_input(&value),
            FollowUp::ValueSelected(feature) => {
                Shared::run_value_selected(shared, Some(feature));
            }
        }
    }

    fn confirm_focused(&self) {
        let focused = {
            let inner = self.shared.lock();
            if inner.dropdown_open {
                inner.focused
            } else {
                None
            }
        };
        if let Some(index) = focused {
            self.select_item(index);
        }
    }

    fn select_item(&self, index: usize) {
        let shared = &self.shared;
        let mut events = Vec::new();
        let follow_up = {
            let mut inner = shared.lock();
            let split = inner.categories.len();
            if index >= split + inner.items.len() {
                return;
            }
            if inner.dropdown_open {
                inner.dropdown_open = false;
                events.push(Event::Close);
            }
            inner.focused = None;
            if index < split {
                let category = inner.categories[index].clone();
                inner.category.set(Some(category.clone()));
                inner.value = category.label.clone();
                FollowUp::CategorySelected(category)
            } else {
                let feature = inner.items[index - split].clone();
                inner.value = Self::display_text(&inner, &feature);
                inner.category.clear();
                FollowUp::ValueSelected(feature)
            }
        };
        for event in &events {
            shared.registry.emit(event);
        }
        match follow_up {
            FollowUp::CategorySelected(category) => {
                shared.places.set_category(category);
                Shared::spawn_places_request(shared, false, None, None);
            }
            FollowUp::ValueSelected(feature) => {
                Shared::run_value_selected(shared, Some(feature));
            }
            FollowUp::None | FollowUp::ReplayInput(_) => {}
        }
    }

    fn handle_escape(&self) {
        let shared = &self.shared;
        let mut events = Vec::new();
        let clear_places = {
            let mut inner = shared.lock();
            let now = Instant::now();
            if inner.dropdown_open {
                inner.dropdown_open = false;
                inner.focused = None;
                inner.last_escape = Some(now);
                events.push(Event::Close);
                false
            } else if inner.category.is_active()
                && inner
                    .last_escape
                    .is_some_and(|t| now.duration_since(t) < ESCAPE_DOUBLE_PRESS_WINDOW)
            {
                inner.value.clear();
                inner.category.clear();
                inner.places_req.cancel();
                inner.last_escape = None;
                events.push(Event::Clear(ClearKind::Category));
                true
            } else {
                // Arms (or re-arms) the double-press window without side
                // effects.
                inner.last_escape = Some(now);
                false
            }
        };
        if clear_places {
            shared.places.reset_category();
        }
        for event in &events {
            shared.registry.emit(event);
        }
    }

    fn display_text(inner: &Inner, feature: &Feature) -> String {
        match &inner.hooks.postprocess {
            Some(postprocess) => postprocess(feature),
            None => inner.formatter.display_text(feature),
        }
    }
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("engine state lock poisoned")
    }

    /// Debounce elapsed: apply the preprocess hook, fetch, and commit the
    /// suggestion set — unless a newer request superseded this one.
    async fn run_geocoder(shared: &Arc<Shared>, token: u64, raw: String) {
        let (text, sender, options) = {
            let inner = shared.lock();
            if !inner.geocoder.is_current(token) {
                return;
            }
            let text = inner
                .hooks
                .preprocess
                .as_ref()
                .map_or_else(|| raw.clone(), |preprocess| preprocess(&raw));
            (text, inner.hooks.send_geocoder.clone(), inner.options.clone())
        };
        shared.registry.emit(&Event::RequestStart {
            query: text.clone(),
        });

        let result = match sender {
            Some(send) => send(text.clone()).await,
            None => shared.client.autocomplete(&text, &options).await,
        };

        match result {
            Err(err) if err.is_canceled() => {}
            Err(err) => {
                let still_current = shared.lock().geocoder.is_current(token);
                if still_current {
                    tracing::warn!(query = %text, error = %err, "geocoder request failed");
                    shared.registry.emit(&Event::RequestEnd {
                        success: false,
                        response: None,
                        error: Some(err.to_string()),
                    });
                }
            }
            Ok(mut response) => {
                let events = {
                    let mut inner = shared.lock();
                    if !inner.geocoder.is_current(token) {
                        return;
                    }
                    if inner.options.add_non_verified_house_number
                        || inner.options.add_non_verified_street
                    {
                        if let Some(parsed) =
                            response.query.as_ref().and_then(|q| q.parsed.clone())
                        {
                            let enhancer = Arc::clone(&inner.enhancer);
                            for feature in &mut response.features {
                                enhancer.enhance(feature, &parsed, &inner.options);
                            }
                        }
                    }
                    let features = match &inner.hooks.suggestions_filter {
                        Some(filter) => filter(response.features.clone()),
                        None => response.features.clone(),
                    };
                    let categories = extract_categories(&response);
                    inner.items = features.clone();
                    inner.categories = categories;
                    inner.focused = None;
                    let mut events = vec![
                        Event::RequestEnd {
                            success: true,
                            response: Some(response),
                            error: None,
                        },
                        Event::Suggestions {
                            query: text.clone(),
                            features,
                        },
                    ];
                    if !(inner.items.is_empty() && inner.categories.is_empty())
                        && !inner.dropdown_open
                    {
                        inner.dropdown_open = true;
                        events.push(Event::Open);
                    }
                    events
                };
                for event in &events {
                    shared.registry.emit(event);
                }
            }
        }
    }

    /// Shared tail of click, Enter, eager arrow selection, and clear.
    fn run_value_selected(shared: &Arc<Shared>, feature: Option<Feature>) {
        let (token, fetch) = {
            let mut inner = shared.lock();
            let token = inner.details.begin();
            let needs_details = feature.as_ref().is_some_and(|f| {
                !inner.options.skip_place_details && f.properties.non_verified_parts.is_empty()
            });
            if !needs_details {
                (token, None)
            } else {
                let sender = inner.hooks.send_place_details.clone();
                let lang = inner.options.lang.clone();
                (token, Some((sender, lang)))
            }
        };

        let Some((sender, lang)) = fetch else {
            shared.registry.emit(&Event::Select(feature));
            return;
        };
        let original = feature.unwrap_or_default();
        shared
            .registry
            .emit(&Event::PlaceDetailsRequestStart(Box::new(original.clone())));

        let task_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            Shared::run_place_details(&task_shared, token, original, sender, lang).await;
        });
        shared.lock().details.attach(token, handle);
    }

    async fn run_place_details(
        shared: &Arc<Shared>,
        token: u64,
        original: Feature,
        sender: Option<PlaceDetailsRequestFn>,
        lang: Option<String>,
    ) {
        // Details only exist for the enhanced data source; everything else
        // resolves with the feature as-is, still bracketed by the events.
        let result: Result<Feature, ApiError> = if !original.is_from_source(ENHANCED_SOURCE) {
            Ok(original.clone())
        } else if let Some(send) = sender {
            send(original.clone()).await.map(|response| {
                response
                    .features
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| original.clone())
            })
        } else if let Some(place_id) = original.place_id().map(str::to_owned) {
            shared
                .client
                .place_details(&place_id, lang.as_deref())
                .await
                .map(|response| {
                    response
                        .features
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| original.clone())
                })
        } else {
            Ok(original.clone())
        };

        match result {
            Err(err) if err.is_canceled() => {}
            Err(err) => {
                let still_current = shared.lock().details.is_current(token);
                if still_current {
                    tracing::warn!(error = %err, "place details request failed");
                    shared.registry.emit(&Event::PlaceDetailsRequestEnd {
                        success: false,
                        feature: None,
                        error: Some(err.to_string()),
                    });
                    shared.registry.emit(&Event::Select(Some(original)));
                }
            }
            Ok(enriched) => {
                let still_current = shared.lock().details.is_current(token);
                if still_current {
                    shared.registry.emit(&Event::PlaceDetailsRequestEnd {
                        success: true,
                        feature: Some(Box::new(enriched.clone())),
                        error: None,
                    });
                    shared.registry.emit(&Event::Select(Some(enriched)));
                }
            }
        }
    }

    /// Issues a places request for the active category at the list's current
    /// offset. `filter`/`bias` overrides win over configured options; with
    /// neither, a proximity bias is derived from IP geolocation on a
    /// best-effort basis.
    fn spawn_places_request(
        shared: &Arc<Shared>,
        append: bool,
        filter_override: Option<FilterMap>,
        bias_override: Option<FilterMap>,
    ) {
        if !shared.lock().options.show_places_list {
            tracing::warn!("places request ignored: the places list is disabled");
            shared.places.finish_loading();
            return;
        }
        let prepared = {
            let mut inner = shared.lock();
            inner.category.get().cloned().map(|category| {
                let token = inner.places_req.begin();
                let mut query =
                    PlacesQuery::new(category.keys.clone(), inner.options.places_limit);
                query.offset = shared.places.current_offset();
                query.lang = inner.options.lang.clone();
                query.filter =
                    filter_override.unwrap_or_else(|| inner.options.places_filters.clone());
                let (bias, need_ip_bias) = match bias_override {
                    Some(bias) => (bias, false),
                    None if !inner.options.places_bias.is_empty() => {
                        (inner.options.places_bias.clone(), false)
                    }
                    None => (FilterMap::new(), true),
                };
                query.bias = bias;
                (token, query, inner.hooks.send_places.clone(), need_ip_bias)
            })
        };
        let Some((token, query, sender, need_ip_bias)) = prepared else {
            tracing::warn!("places request ignored: no category is active");
            shared.places.finish_loading();
            return;
        };

        shared.registry.emit(&Event::PlacesRequestStart);
        let task_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            Shared::run_places(&task_shared, token, query, sender, need_ip_bias, append).await;
        });
        shared.lock().places_req.attach(token, handle);
    }

    async fn run_places(
        shared: &Arc<Shared>,
        token: u64,
        mut query: PlacesQuery,
        sender: Option<PlacesRequestFn>,
        need_ip_bias: bool,
        append: bool,
    ) {
        if need_ip_bias {
            match shared.client.ip_locate().await {
                Ok(info) => {
                    if let Some(location) = info.location {
                        query.bias.insert(
                            FilterKind::Proximity,
                            FilterValue::Proximity {
                                lon: location.longitude,
                                lat: location.latitude,
                            },
                        );
                    }
                }
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        "ip geolocation failed; sending places request without bias"
                    );
                }
            }
        }

        let result = match sender {
            Some(send) => send(query.clone()).await,
            None => shared.client.places(&query).await,
        };

        match result {
            Err(err) if err.is_canceled() => {}
            Err(err) => {
                let still_current = shared.lock().places_req.is_current(token);
                if still_current {
                    tracing::warn!(error = %err, "places request failed");
                    shared.places.finish_loading();
                    shared.registry.emit(&Event::PlacesRequestEnd {
                        success: false,
                        features: None,
                        error: Some(err.to_string()),
                    });
                }
            }
            Ok(response) => {
                {
                    let inner = shared.lock();
                    if !inner.places_req.is_current(token) {
                        return;
                    }
                }
                shared.places.set_places(response.features.clone(), append);
                shared
                    .registry
                    .emit(&Event::Places(response.features.clone()));
                shared.registry.emit(&Event::PlacesRequestEnd {
                    success: true,
                    features: Some(response.features),
                    error: None,
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
