use crate::event::DatabaseEvent;
use crate::types::{EventCallback, SignalError};
use config::SignalConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Handle returned when registering a callback, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Signal manager for database event notifications
pub struct SignalManager {
    callbacks: RwLock<Vec<(CallbackId, EventCallback)>>,
    next_id: AtomicU64,
    max_callbacks: usize,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .field("max_callbacks", &self.max_callbacks)
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self::with_config(&SignalConfig::default())
    }

    pub fn with_config(config: &SignalConfig) -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            max_callbacks: config.max_callbacks,
        }
    }

    /// Add event callback
    pub fn add_callback<F>(&self, callback: F) -> Result<CallbackId, SignalError>
    where
        F: Fn(&DatabaseEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if callbacks.len() >= self.max_callbacks {
            return Err(SignalError::TooManyCallbacks(self.max_callbacks));
        }

        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        callbacks.push((id, Arc::new(callback)));
        Ok(id)
    }

    /// Remove a previously registered callback
    pub fn remove_callback(&self, id: CallbackId) -> Result<(), SignalError> {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);

        if callbacks.len() == before {
            return Err(SignalError::UnknownCallback(id.0));
        }
        Ok(())
    }

    /// Emit event to all subscribers, in registration order
    pub fn emit(&self, event: DatabaseEvent) {
        // Snapshot so listeners may register or remove callbacks while running
        let snapshot: Vec<EventCallback> = self
            .callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        tracing::trace!(
            hook = %event.hook_name(),
            table = %event.table_name,
            listeners = snapshot.len(),
            "emitting signal"
        );

        for callback in snapshot {
            callback(&event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        self.callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use std::sync::Mutex;

    #[test]
    fn callbacks_run_in_registration_order() {
        let manager = SignalManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second"] {
            let seen = Arc::clone(&seen);
            manager
                .add_callback(move |event: &DatabaseEvent| {
                    seen.lock().unwrap().push(format!("{}:{}", label, event.hook_name()));
                })
                .unwrap();
        }

        manager.emit(DatabaseEvent::new(EventType::PreCreate, "t").with_tag("subscriber"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:pre_create_subscriber", "second:pre_create_subscriber"]
        );
    }

    #[test]
    fn enforces_callback_limit() {
        let manager = SignalManager::with_config(&SignalConfig::new(1));
        manager.add_callback(|_| {}).unwrap();

        assert_eq!(
            manager.add_callback(|_| {}),
            Err(SignalError::TooManyCallbacks(1))
        );
    }

    #[test]
    fn removed_callbacks_stop_receiving() {
        let manager = SignalManager::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let id = manager
            .add_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        manager.emit(DatabaseEvent::new(EventType::Delete, "t"));
        manager.remove_callback(id).unwrap();
        manager.emit(DatabaseEvent::new(EventType::Delete, "t"));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.callback_count(), 0);
        assert_eq!(
            manager.remove_callback(id),
            Err(SignalError::UnknownCallback(id.value()))
        );
    }

    #[test]
    fn poisoned_lock_still_delivers_events() {
        let manager = Arc::new(SignalManager::new());
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        manager
            .add_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let poisoner = Arc::clone(&manager);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.callbacks.write().unwrap();
            panic!("listener registration failed");
        })
        .join();
        assert!(result.is_err());
        assert!(manager.callbacks.is_poisoned());

        manager.emit(DatabaseEvent::new(EventType::PostUpdate, "t"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.callback_count(), 1);

        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let manager = SignalManager::default();
        manager.emit(DatabaseEvent::new(EventType::PostInsert, "t"));
        assert_eq!(manager.callback_count(), 0);
    }
}
