use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::foundation::tunables::DEFAULT_INFERENCE_PERMITS;

/// Counting gate bounding how many inference runs may be in flight at once.
///
/// Clones share the same permits.
#[derive(Clone, Debug)]
pub struct InferenceGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    capacity: usize,
    available: Mutex<usize>,
    freed: Condvar,
}

/// Held for the duration of one inference run; returns its permit on drop.
#[derive(Debug)]
pub struct InferencePermit {
    inner: Arc<GateInner>,
}

impl Default for InferenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_INFERENCE_PERMITS)
    }
}

impl InferenceGate {
    pub fn new(permits: usize) -> Self {
        let capacity = permits.max(1);
        Self {
            inner: Arc::new(GateInner {
                capacity,
                available: Mutex::new(capacity),
                freed: Condvar::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn available(&self) -> usize {
        *self.inner.lock()
    }

    /// Block until a permit is free.
    pub fn acquire(&self) -> InferencePermit {
        let mut available = self.inner.lock();
        while *available == 0 {
            available = self
                .inner
                .freed
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        InferencePermit {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn try_acquire(&self) -> Option<InferencePermit> {
        let mut available = self.inner.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(InferencePermit {
            inner: Arc::clone(&self.inner),
        })
    }
}

impl GateInner {
    // The counter stays consistent even if a holder panicked, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for InferencePermit {
    fn drop(&mut self) {
        let mut available = self.inner.lock();
        *available = (*available + 1).min(self.inner.capacity);
        self.inner.freed.notify_one();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/gate.rs"]
mod tests;
