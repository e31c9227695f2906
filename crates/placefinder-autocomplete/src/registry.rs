//! Listener registration and synchronous event dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::events::{Event, EventKind};

/// A registered listener. Identity (the `Arc` allocation) is what makes
/// registration set-like and what `off` matches on.
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

struct Entry {
    callback: Callback,
    once: bool,
}

/// Typed pub/sub table mapping event kinds to listener lists.
///
/// Notification is synchronous and in registration order. Listeners are
/// snapshotted before invocation, so a listener may re-enter the registry
/// (register, unregister) without deadlocking or affecting the current
/// dispatch round.
#[derive(Default)]
pub struct CallbackRegistry {
    channels: Mutex<HashMap<EventKind, Vec<Entry>>>,
}

fn same_callback(a: &Callback, b: &Callback) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Registering the identical callback twice on the
    /// same channel is a no-op.
    pub fn on(&self, kind: EventKind, callback: Callback) {
        self.register(kind, callback, false);
    }

    /// Registers a listener that unregisters itself after its first
    /// invocation.
    pub fn once(&self, kind: EventKind, callback: Callback) {
        self.register(kind, callback, true);
    }

    fn register(&self, kind: EventKind, callback: Callback, once: bool) {
        let mut channels = self.channels.lock().expect("registry lock poisoned");
        let entries = channels.entry(kind).or_default();
        if entries.iter().any(|e| same_callback(&e.callback, &callback)) {
            return;
        }
        entries.push(Entry { callback, once });
    }

    /// Removes one listener, or every listener on the channel when
    /// `callback` is `None`.
    pub fn off(&self, kind: EventKind, callback: Option<&Callback>) {
        let mut channels = self.channels.lock().expect("registry lock poisoned");
        match callback {
            Some(callback) => {
                if let Some(entries) = channels.get_mut(&kind) {
                    entries.retain(|e| !same_callback(&e.callback, callback));
                }
            }
            None => {
                channels.remove(&kind);
            }
        }
    }

    /// Delivers `event` to the channel's listeners, in registration order.
    /// One-shot listeners are removed before their callback runs.
    pub fn emit(&self, event: &Event) {
        let snapshot: Vec<Callback> = {
            let mut channels = self.channels.lock().expect("registry lock poisoned");
            let Some(entries) = channels.get_mut(&event.kind()) else {
                return;
            };
            let callbacks = entries.iter().map(|e| Arc::clone(&e.callback)).collect();
            entries.retain(|e| !e.once);
            callbacks
        };
        for callback in snapshot {
            callback(event);
        }
    }

    /// Number of listeners currently registered on a channel.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.channels
            .lock()
            .expect("registry lock poisoned")
            .get(&kind)
            .map_or(0, Vec::len)
    }
}
