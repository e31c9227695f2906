//! Places results list: pagination state, page accumulation, selection.
//!
//! One implementation serves every widget variant; rendering and load-more
//! wiring go through the small callback bundle instead of subclassing. The
//! state lock is always released before a callback runs, so callbacks may
//! call back into the list (or the engine) freely.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use placefinder_core::category::Category;
use placefinder_core::feature::Feature;

/// How close to the bottom edge (in pixels) scroll must get before a lazy
/// load-more fires.
const SCROLL_EDGE_PX: f64 = 10.0;

/// Fired when the list wants the next page fetched.
pub type LoadMoreFn = Arc<dyn Fn() + Send + Sync>;
/// Fired with the rows a sink must render: the full list on replace, the
/// freshly appended residue on append.
pub type PlacesUpdateFn = Arc<dyn Fn(&[Feature], bool) + Send + Sync>;
/// Fired when the highlighted row changes.
pub type PlaceSelectFn = Arc<dyn Fn(Option<&Feature>) + Send + Sync>;

#[derive(Clone, Default)]
pub struct PlacesCallbacks {
    pub on_load_more: Option<LoadMoreFn>,
    pub on_places_update: Option<PlacesUpdateFn>,
    pub on_place_select: Option<PlaceSelectFn>,
}

#[derive(Debug, Default)]
struct PlacesState {
    offset: u32,
    category: Option<Category>,
    has_more: bool,
    accumulated: Vec<Feature>,
    is_loading_more: bool,
    selected: Option<usize>,
    page_limit: u32,
    lazy_load: bool,
}

/// Owner of the optional places results list.
pub struct PlacesList {
    state: Mutex<PlacesState>,
    callbacks: Mutex<PlacesCallbacks>,
}

impl PlacesList {
    #[must_use]
    pub fn new(page_limit: u32, lazy_load: bool) -> Self {
        Self {
            state: Mutex::new(PlacesState {
                page_limit,
                lazy_load,
                ..PlacesState::default()
            }),
            callbacks: Mutex::new(PlacesCallbacks::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlacesState> {
        self.state.lock().expect("places state lock poisoned")
    }

    fn callbacks(&self) -> PlacesCallbacks {
        self.callbacks
            .lock()
            .expect("places callbacks lock poisoned")
            .clone()
    }

    pub fn set_on_load_more(&self, callback: Option<LoadMoreFn>) {
        self.callbacks
            .lock()
            .expect("places callbacks lock poisoned")
            .on_load_more = callback;
    }

    pub fn set_on_places_update(&self, callback: Option<PlacesUpdateFn>) {
        self.callbacks
            .lock()
            .expect("places callbacks lock poisoned")
            .on_places_update = callback;
    }

    pub fn set_on_place_select(&self, callback: Option<PlaceSelectFn>) {
        self.callbacks
            .lock()
            .expect("places callbacks lock poisoned")
            .on_place_select = callback;
    }

    /// Enters (or switches) category mode: pagination and accumulation start
    /// over from offset zero.
    pub fn set_category(&self, category: Category) {
        let mut state = self.lock();
        state.category = Some(category);
        state.offset = 0;
        state.has_more = false;
        state.accumulated.clear();
        state.is_loading_more = false;
        state.selected = None;
    }

    /// Leaves category mode and forgets the accumulated list.
    pub fn reset_category(&self) {
        let mut state = self.lock();
        state.category = None;
        state.offset = 0;
        state.has_more = false;
        state.accumulated.clear();
        state.is_loading_more = false;
        state.selected = None;
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.lock().category.clone()
    }

    /// Stores one response page.
    ///
    /// Replacing re-renders from scratch and drops any selection. Appending
    /// filters out features whose place identifier is already accumulated,
    /// then appends only the residue — a requery overlapping a previous page
    /// never yields duplicate rows. `has_more` is recomputed from the raw
    /// page length: a short page is the end-of-results signal.
    pub fn set_places(&self, page: Vec<Feature>, append: bool) {
        let (rendered, callbacks) = {
            let mut state = self.lock();
            let page_len = u32::try_from(page.len()).unwrap_or(u32::MAX);
            state.has_more = state.page_limit > 0 && page_len == state.page_limit;
            state.is_loading_more = false;

            let rendered = if append {
                let seen: HashSet<String> = state
                    .accumulated
                    .iter()
                    .filter_map(|f| f.place_id().map(str::to_owned))
                    .collect();
                let residue: Vec<Feature> = page
                    .into_iter()
                    .filter(|f| f.place_id().is_none_or(|id| !seen.contains(id)))
                    .collect();
                state.accumulated.extend(residue.iter().cloned());
                residue
            } else {
                state.selected = None;
                state.accumulated = page;
                state.accumulated.clone()
            };
            (rendered, self.callbacks())
        };
        if let Some(update) = callbacks.on_places_update {
            update(&rendered, append);
        }
    }

    #[must_use]
    pub fn places(&self) -> Vec<Feature> {
        self.lock().accumulated.clone()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.lock().is_loading_more
    }

    #[must_use]
    pub fn current_offset(&self) -> u32 {
        self.lock().offset
    }

    pub fn set_current_offset(&self, offset: u32) {
        self.lock().offset = offset;
    }

    pub fn set_page_limit(&self, page_limit: u32) {
        self.lock().page_limit = page_limit;
    }

    pub fn set_lazy_load(&self, lazy_load: bool) {
        self.lock().lazy_load = lazy_load;
    }

    /// Marks a row as the active selection. Purely presentational: any index
    /// is safe, an out-of-range one simply matches no row. Returns the
    /// feature at the index, when there is one.
    pub fn select_place(&self, index: Option<usize>) -> Option<Feature> {
        let (feature, callbacks) = {
            let mut state = self.lock();
            state.selected = index;
            let feature = index.and_then(|i| state.accumulated.get(i).cloned());
            (feature, self.callbacks())
        };
        if let Some(select) = callbacks.on_place_select {
            select(feature.as_ref());
        }
        feature
    }

    pub fn clear_selection(&self) {
        let _ = self.select_place(None);
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.lock().selected
    }

    /// Empties the rendered list without leaving category mode.
    pub fn clear_places_list(&self) {
        let callbacks = {
            let mut state = self.lock();
            state.accumulated.clear();
            state.offset = 0;
            state.has_more = false;
            state.is_loading_more = false;
            state.selected = None;
            self.callbacks()
        };
        if let Some(update) = callbacks.on_places_update {
            update(&[], false);
        }
    }

    /// Requests the next page. Returns `false` (and does nothing) while a
    /// load-more is already in flight, once the last page was short, or when
    /// no category is active.
    pub fn request_more(&self) -> bool {
        let callbacks = {
            let mut state = self.lock();
            if state.is_loading_more || !state.has_more || state.category.is_none() {
                return false;
            }
            state.is_loading_more = true;
            state.offset += state.page_limit;
            self.callbacks()
        };
        if let Some(load_more) = callbacks.on_load_more {
            load_more();
        }
        true
    }

    /// Scroll-driven load-more: fires when lazy loading is enabled and the
    /// viewport bottom is within [`SCROLL_EDGE_PX`] of the content bottom.
    pub fn notify_scroll(&self, scroll_top: f64, viewport_height: f64, content_height: f64) -> bool {
        {
            let state = self.lock();
            if !state.lazy_load {
                return false;
            }
        }
        if scroll_top + viewport_height < content_height - SCROLL_EDGE_PX {
            return false;
        }
        self.request_more()
    }

    /// Failure path: allows a new load-more after a page request died.
    pub(crate) fn finish_loading(&self) {
        self.lock().is_loading_more = false;
    }
}

#[cfg(test)]
#[path = "places_test.rs"]
mod tests;
