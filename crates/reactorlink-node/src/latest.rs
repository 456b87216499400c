use std::sync::{Arc, Mutex};

/// Single-slot overwrite cell for latest-value semantics.
///
/// The agent's link loop publishes every decoded telemetry sample; the
/// uplink bridge takes whatever is current when it polls. A slow uplink
/// sees only the newest sample, never a backlog.
#[derive(Debug)]
pub struct LatestSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Store a value, discarding any previous occupant.
    pub fn publish(&self, value: T) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(value);
    }

    /// Remove and return the current value, if any.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }
}
