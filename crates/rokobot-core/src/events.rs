//! Named publish/subscribe registry
//!
//! Decouples the chat session from cosmetic listeners such as the blinking
//! eye. One bus is created by the application and handed to whoever needs it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Emitted when a reply starts being fetched.
pub const RESPONSE_STARTED: &str = "aiResponse";
/// Emitted once the exchange is over, whatever the outcome.
pub const RESPONSE_ENDED: &str = "stopBlinking";

/// A subscriber callback. Identity is the `Arc` allocation, so keep a clone
/// around to pass to [`EventBus::off`].
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`. Registering twice means it runs twice.
    pub fn on(&self, name: &str, listener: Listener) {
        self.listeners
            .lock()
            .entry(name.to_string())
            .or_default()
            .push(listener);
    }

    /// Remove one registration of `listener`. Unknown listeners are ignored.
    pub fn off(&self, name: &str, listener: &Listener) {
        let mut listeners = self.listeners.lock();
        if let Some(registered) = listeners.get_mut(name) {
            if let Some(pos) = registered.iter().position(|l| same_listener(l, listener)) {
                registered.remove(pos);
            }
            if registered.is_empty() {
                listeners.remove(name);
            }
        }
    }

    /// Invoke every listener registered for `name`, in registration order.
    ///
    /// The list is snapshotted first: listeners added during emission wait
    /// for the next emit, and listeners may call back into the bus.
    pub fn emit(&self, name: &str, args: &[Value]) {
        let snapshot: Vec<Listener> = match self.listeners.lock().get(name) {
            Some(registered) => registered.clone(),
            None => return,
        };

        tracing::trace!(event = name, listeners = snapshot.len(), "emit");
        for listener in snapshot {
            listener(args);
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.lock().get(name).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(name, l)| (name.as_str(), l.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
