//! Single-flight lazy initialization for expensive backend state.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Holds a backend's expensive initialization state (loaded model weights,
/// probed engine configuration). First use pays the initialization cost;
/// subsequent uses share the same `Arc`.
///
/// The slot sits behind an `RwLock` so the initialized hot path is a read
/// lock only. Initialization is single-flight: a separate mutex is held
/// for the duration of `init`, so concurrent first-users block on the
/// in-flight initialization instead of triggering duplicate loads, while
/// readers of an already-filled slot never touch that mutex.
pub struct LazyEngine<T> {
    slot: RwLock<Option<Arc<T>>>,
    init_lock: Mutex<()>,
}

impl<T> LazyEngine<T> {
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            init_lock: Mutex::new(()),
        }
    }

    fn read_slot(&self) -> Option<Arc<T>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// Returns the initialized engine, running `init` exactly once across
    /// all callers. A failed initialization leaves the slot empty so a
    /// later call can retry.
    pub fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(engine) = self.read_slot() {
            return Ok(engine);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another initializer may have filled the slot while we waited.
        if let Some(engine) = self.read_slot() {
            return Ok(engine);
        }

        let engine = Arc::new(init()?);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Teardown hook for tests: clears the cached engine so the next use
    /// re-initializes.
    pub fn reset(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl<T> Default for LazyEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_init_runs_once() {
        let engine: LazyEngine<u32> = LazyEngine::new();
        let calls = AtomicUsize::new(0);

        let init = || -> Result<u32, ()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        };

        let a = engine.get_or_try_init(init).unwrap();
        let b = engine
            .get_or_try_init(|| -> Result<u32, ()> { panic!("must not re-init") })
            .unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_init_retries() {
        let engine: LazyEngine<u32> = LazyEngine::new();

        let err = engine.get_or_try_init(|| Err::<u32, &str>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(!engine.is_initialized());

        let ok = engine.get_or_try_init(|| Ok::<u32, &str>(7)).unwrap();
        assert_eq!(*ok, 7);
        assert!(engine.is_initialized());
    }

    #[test]
    fn test_reset_forces_reinit() {
        let engine: LazyEngine<u32> = LazyEngine::new();
        engine.get_or_try_init(|| Ok::<u32, ()>(1)).unwrap();
        assert!(engine.is_initialized());

        engine.reset();
        assert!(!engine.is_initialized());

        let v = engine.get_or_try_init(|| Ok::<u32, ()>(2)).unwrap();
        assert_eq!(*v, 2);
    }

    #[test]
    fn test_concurrent_first_use_single_flight() {
        let engine: Arc<LazyEngine<u32>> = Arc::new(LazyEngine::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    let v = engine
                        .get_or_try_init(|| -> Result<u32, ()> {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            Ok(9)
                        })
                        .unwrap();
                    assert_eq!(*v, 9);
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_initialized_reads_never_reenter_init() {
        let engine: Arc<LazyEngine<u32>> = Arc::new(LazyEngine::new());
        engine.get_or_try_init(|| Ok::<u32, ()>(5)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let v = engine
                            .get_or_try_init(|| -> Result<u32, ()> {
                                panic!("initialized slot must be read-only")
                            })
                            .unwrap();
                        assert_eq!(*v, 5);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
