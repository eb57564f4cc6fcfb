//! Reactive State Bus
//!
//! A process-wide observable map over a fixed set of keys, decoupled from
//! persistence. UI collaborators use it to broadcast ephemeral cross-cutting
//! state (the loaded profile, the in-progress workout session, the session
//! timer handle) without touching the store.
//!
//! Notification is synchronous and runs in subscription order on the calling
//! task. Subscribers must not block, and a subscriber that writes the key it
//! is reacting to will recurse without bound; both are caller
//! responsibilities. A panicking subscriber is caught and logged, and does
//! not prevent the remaining subscribers from running.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The fixed key set. Extending it is a design-level change; there is no
/// runtime registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum StateKey {
    /// The loaded user profile.
    Profile,
    /// The in-progress workout session, if any.
    ActiveSession,
    /// Handle of the running session timer, if any.
    SessionTimer,
}

/// Token returned by [`StateBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&Value, &Value) + Send + Sync + 'static>;

/// Observable key/value store over [`StateKey`].
///
/// Values are JSON; unset keys read as `Value::Null`.
pub struct StateBus {
    values: Mutex<HashMap<StateKey, Value>>,
    subscribers: Mutex<HashMap<StateKey, Vec<(SubscriptionId, Subscriber)>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for StateBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBus").finish_non_exhaustive()
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new()
    }
}

impl StateBus {
    /// Create a bus with every key set to `Value::Null`.
    pub fn new() -> Self {
        use strum::IntoEnumIterator;

        let values = StateKey::iter().map(|key| (key, Value::Null)).collect();
        Self {
            values: Mutex::new(values),
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Read the current value of a key. No side effects.
    pub fn get(&self, key: StateKey) -> Value {
        self.values
            .lock()
            .expect("state map poisoned")
            .get(&key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write a key and synchronously notify its subscribers with
    /// `(new, old)`.
    ///
    /// Writing a value equal to the current one is a silent no-op: no
    /// update, no notification. (Values are compared by content; callers
    /// that mutate a record and write it back will always notify.)
    pub fn set(&self, key: StateKey, value: Value) {
        let old = {
            let mut values = self.values.lock().expect("state map poisoned");
            let current = values.get(&key).cloned().unwrap_or(Value::Null);
            if current == value {
                return;
            }
            values.insert(key, value.clone());
            current
        };

        // Snapshot outside the lock so subscribers can use the bus freely
        // (except writing the key they are reacting to).
        let subscribers: Vec<Subscriber> = {
            let registry = self.subscribers.lock().expect("subscriber registry poisoned");
            registry
                .get(&key)
                .map(|entries| entries.iter().map(|(_, f)| Arc::clone(f)).collect())
                .unwrap_or_default()
        };

        for subscriber in subscribers {
            let result = catch_unwind(AssertUnwindSafe(|| subscriber(&value, &old)));
            if result.is_err() {
                tracing::error!(key = %key, "state subscriber panicked, continuing with remaining subscribers");
            }
        }
    }

    /// Write a key addressed by its string name.
    ///
    /// An unknown name is logged and ignored; the key set is never extended
    /// at runtime.
    pub fn set_named(&self, key: &str, value: Value) {
        match StateKey::from_str(key) {
            Ok(key) => self.set(key, value),
            Err(_) => {
                tracing::warn!(key, "ignoring write to unknown state key");
            }
        }
    }

    /// Register a callback invoked with `(new, old)` on every effective
    /// write to `key`, in subscription order.
    pub fn subscribe(
        &self,
        key: StateKey,
        subscriber: impl Fn(&Value, &Value) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .expect("subscriber registry poisoned")
            .entry(key)
            .or_default()
            .push((id, Arc::new(subscriber)));
        id
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, key: StateKey, id: SubscriptionId) -> bool {
        let mut registry = self.subscribers.lock().expect("subscriber registry poisoned");
        let Some(entries) = registry.get_mut(&key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            registry.remove(&key);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_get_defaults_to_null() {
        let bus = StateBus::new();
        assert_eq!(bus.get(StateKey::Profile), Value::Null);
        assert_eq!(bus.get(StateKey::ActiveSession), Value::Null);
    }

    #[test]
    fn test_set_then_get() {
        let bus = StateBus::new();
        bus.set(StateKey::SessionTimer, json!(42));
        assert_eq!(bus.get(StateKey::SessionTimer), json!(42));
    }

    #[test]
    fn test_subscriber_receives_new_and_old() {
        let bus = StateBus::new();
        let seen: Arc<Mutex<Vec<(Value, Value)>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_by_cb = Arc::clone(&seen);
        bus.subscribe(StateKey::Profile, move |new, old| {
            seen_by_cb
                .lock()
                .unwrap()
                .push((new.clone(), old.clone()));
        });

        bus.set(StateKey::Profile, json!({"name": "A"}));
        bus.set(StateKey::Profile, json!({"name": "B"}));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (json!({"name": "A"}), Value::Null));
        assert_eq!(seen[1], (json!({"name": "B"}), json!({"name": "A"})));
    }

    #[test]
    fn test_equal_value_does_not_notify() {
        let bus = StateBus::new();
        bus.set(StateKey::ActiveSession, json!({"id": "s-1"}));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_by_cb = Arc::clone(&calls);
        bus.subscribe(StateKey::ActiveSession, move |_, _| {
            calls_by_cb.fetch_add(1, Ordering::SeqCst);
        });

        bus.set(StateKey::ActiveSession, json!({"id": "s-1"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        bus.set(StateKey::ActiveSession, json!({"id": "s-2"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_subscriber_does_not_starve_others() {
        let bus = StateBus::new();

        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe(StateKey::Profile, |_, _| {
            panic!("subscriber bug");
        });
        let calls_by_cb = Arc::clone(&calls);
        bus.subscribe(StateKey::Profile, move |_, _| {
            calls_by_cb.fetch_add(1, Ordering::SeqCst);
        });

        bus.set(StateKey::Profile, json!({"name": "A"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notification_in_subscription_order() {
        let bus = StateBus::new();
        let order: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

        for tag in [1u8, 2, 3] {
            let order_by_cb = Arc::clone(&order);
            bus.subscribe(StateKey::SessionTimer, move |_, _| {
                order_by_cb.lock().unwrap().push(tag);
            });
        }

        bus.set(StateKey::SessionTimer, json!(1));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let bus = StateBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_by_cb = Arc::clone(&calls);
        let id = bus.subscribe(StateKey::Profile, move |_, _| {
            calls_by_cb.fetch_add(1, Ordering::SeqCst);
        });

        bus.set(StateKey::Profile, json!(1));
        assert!(bus.unsubscribe(StateKey::Profile, id));
        bus.set(StateKey::Profile, json!(2));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!bus.unsubscribe(StateKey::Profile, id));
    }

    #[test]
    fn test_unknown_named_key_is_ignored() {
        let bus = StateBus::new();
        bus.set_named("somethingElse", json!(123));

        // Known keys are untouched and the key set did not grow
        assert_eq!(bus.get(StateKey::Profile), Value::Null);
        assert_eq!(bus.get(StateKey::ActiveSession), Value::Null);
        assert_eq!(bus.get(StateKey::SessionTimer), Value::Null);
    }

    #[test]
    fn test_named_key_spelling() {
        let bus = StateBus::new();
        bus.set_named("activeSession", json!({"id": "s-1"}));
        assert_eq!(bus.get(StateKey::ActiveSession), json!({"id": "s-1"}));
        assert_eq!(StateKey::ActiveSession.to_string(), "activeSession");
    }

    #[test]
    fn test_subscriber_can_read_other_keys() {
        let bus = Arc::new(StateBus::new());
        let observed = Arc::new(Mutex::new(Value::Null));

        let bus_for_cb = Arc::clone(&bus);
        let observed_by_cb = Arc::clone(&observed);
        bus.subscribe(StateKey::ActiveSession, move |_, _| {
            *observed_by_cb.lock().unwrap() = bus_for_cb.get(StateKey::Profile);
        });

        bus.set(StateKey::Profile, json!({"name": "A"}));
        bus.set(StateKey::ActiveSession, json!({"id": "s-1"}));

        assert_eq!(*observed.lock().unwrap(), json!({"name": "A"}));
    }
}
