//! Category descriptors and the category-mode state pair.
//!
//! A category is one or more raw category keys plus a user-facing label.
//! The canonical field name throughout the workspace is `keys`; older
//! payloads that spell it `category` are accepted on input only.

use serde::{Deserialize, Serialize};

use crate::feature::GeocodeResponse;

/// A selected or suggested place category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Raw category identifiers sent to the places endpoint.
    pub keys: Vec<String>,
    /// User-facing text.
    pub label: String,
}

impl Category {
    #[must_use]
    pub fn new(keys: Vec<String>, label: impl Into<String>) -> Self {
        Self {
            keys,
            label: label.into(),
        }
    }
}

/// A single key becomes `{keys: [s], label: s}`.
impl From<&str> for Category {
    fn from(key: &str) -> Self {
        Self {
            keys: vec![key.to_owned()],
            label: key.to_owned(),
        }
    }
}

impl From<String> for Category {
    fn from(key: String) -> Self {
        Self {
            label: key.clone(),
            keys: vec![key],
        }
    }
}

/// A key list becomes `{keys: arr, label: arr.join(", ")}`.
impl From<Vec<String>> for Category {
    fn from(keys: Vec<String>) -> Self {
        Self {
            label: keys.join(", "),
            keys,
        }
    }
}

impl From<&[&str]> for Category {
    fn from(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
            label: keys.join(", "),
        }
    }
}

/// Tracks whether category mode is active and which category is selected.
///
/// The mode flag and the held value always move together: `is_active()` is
/// true iff a category is held and the flag is set. Keeping the explicit
/// flag distinguishes "never selected" from "selected-then-cleared" at the
/// call sites that arm the double-escape window.
#[derive(Debug, Clone, Default)]
pub struct CategoryState {
    active: bool,
    selected: Option<Category>,
}

impl CategoryState {
    /// Selects a category; `None` is equivalent to [`CategoryState::clear`].
    pub fn set(&mut self, category: Option<Category>) {
        self.active = category.is_some();
        self.selected = category;
    }

    #[must_use]
    pub fn get(&self) -> Option<&Category> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && self.selected.is_some()
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.selected = None;
    }
}

/// Pulls the `query.categories` list out of a geocoder response.
///
/// Each entry may be a bare key string, a key array, or an object with a
/// `keys` (or legacy `category`) field and an optional `label`. Key lists
/// are normalized to arrays; entries with no usable keys are skipped.
/// Missing or empty input yields an empty list and never errors.
#[must_use]
pub fn extract_categories(response: &GeocodeResponse) -> Vec<Category> {
    let Some(entries) = response
        .query
        .as_ref()
        .and_then(|q| q.categories.as_ref())
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            serde_json::Value::String(key) if !key.is_empty() => Some(Category::from(key.as_str())),
            serde_json::Value::Array(_) => {
                let keys = string_list(entry)?;
                Some(Category::from(keys))
            }
            serde_json::Value::Object(obj) => {
                let raw_keys = obj.get("keys").or_else(|| obj.get("category"))?;
                let keys = string_list(raw_keys)?;
                let label = obj
                    .get("label")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| keys.join(", "), str::to_owned);
                Some(Category { keys, label })
            }
            _ => None,
        })
        .collect()
}

/// Normalizes a JSON string or string array into a non-empty key list.
fn string_list(value: &serde_json::Value) -> Option<Vec<String>> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(vec![s.clone()]),
        serde_json::Value::Array(items) => {
            let keys: Vec<String> = items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if keys.is_empty() {
                None
            } else {
                Some(keys)
            }
        }
        _ => None,
    }
}
