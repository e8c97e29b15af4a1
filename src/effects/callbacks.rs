//! Payload-sent subscriber registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::data::PayloadSentArgs;

/// Subscriber invoked after every successful send.
pub type PayloadSentCallback = dyn Fn(&mut PayloadSentArgs<'_>) + Send + Sync;

struct RegistryInner {
    next_id: u64,
    subscribers: Vec<(u64, Arc<PayloadSentCallback>)>,
}

/// Ordered collection of payload-sent subscribers.
///
/// Registration order is invocation order. Dropping the registry releases
/// every subscriber and turns outstanding [`CallbackRegistration`] handles
/// into no-ops.
pub struct CallbackRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

/// Handle for one registered subscriber.
///
/// Dropping it removes exactly that subscriber, leaving the registry and
/// other registrations intact.
#[must_use = "dropping the registration unregisters the subscriber"]
pub struct CallbackRegistration {
    id: u64,
    inner: Weak<Mutex<RegistryInner>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn register(&self, callback: Arc<PayloadSentCallback>) -> CallbackRegistration {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, callback));
        CallbackRegistration {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    /// Copies the current subscriber list in registration order, so that
    /// notification never holds the lock while running subscriber code.
    pub fn snapshot(&self) -> Vec<Arc<PayloadSentCallback>> {
        lock(&self.inner)
            .subscribers
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CallbackRegistration {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
