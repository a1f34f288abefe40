//! Registry of active sandboxed executions.
//!
//! The execution boundary inserts a handle when a sandbox starts and removes
//! it on every exit path; the kill-switch drains the registry to terminate
//! everything. This is the only mutable state shared across concurrent
//! gateway invocations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

/// Handle to one running sandbox: its container name plus a cancellation
/// signal the owning execution listens on.
#[derive(Debug, Clone)]
pub struct SandboxHandle {
    pub name: String,
    pub cancel: Arc<Notify>,
}

/// Concurrent insert/remove/enumerate registry keyed by sandbox id.
#[derive(Debug, Default)]
pub struct SandboxRegistry {
    inner: Mutex<HashMap<u64, SandboxHandle>>,
    next_id: AtomicU64,
}

impl SandboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a starting sandbox. Returns its id and the cancellation
    /// signal the execution must select on.
    pub fn register(&self, name: impl Into<String>) -> (u64, Arc<Notify>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = Arc::new(Notify::new());
        let handle = SandboxHandle {
            name: name.into(),
            cancel: Arc::clone(&cancel),
        };
        self.lock().insert(id, handle);
        (id, cancel)
    }

    /// Remove a sandbox that has stopped. Idempotent.
    pub fn deregister(&self, id: u64) {
        drop(self.lock().remove(&id));
    }

    /// Remove and return every active handle.
    pub fn drain(&self) -> Vec<SandboxHandle> {
        self.lock().drain().map(|(_, handle)| handle).collect()
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, SandboxHandle>> {
        // A poisoned registry lock still holds a usable map
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Removes a registry entry when dropped, so an execution future that is
/// cancelled mid-flight never leaks its handle.
pub(crate) struct RegistryGuard {
    registry: Arc<SandboxRegistry>,
    id: u64,
}

impl RegistryGuard {
    pub(crate) fn new(registry: Arc<SandboxRegistry>, id: u64) -> Self {
        Self { registry, id }
    }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_deregister() {
        let registry = SandboxRegistry::new();
        let (id_a, _) = registry.register("sbx-a");
        let (id_b, _) = registry.register("sbx-b");
        assert_ne!(id_a, id_b);
        assert_eq!(registry.active_count(), 2);

        registry.deregister(id_a);
        assert_eq!(registry.active_count(), 1);

        // Idempotent remove
        registry.deregister(id_a);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = SandboxRegistry::new();
        drop(registry.register("sbx-a"));
        drop(registry.register("sbx-b"));

        let handles = registry.drain();
        assert_eq!(handles.len(), 2);
        assert_eq!(registry.active_count(), 0);
        assert!(registry.drain().is_empty());
    }

    #[test]
    fn test_guard_deregisters_on_drop() {
        let registry = Arc::new(SandboxRegistry::new());
        let (id, _) = registry.register("sbx-a");
        {
            let _guard = RegistryGuard::new(Arc::clone(&registry), id);
            assert_eq!(registry.active_count(), 1);
        }
        assert_eq!(registry.active_count(), 0);
    }
}
