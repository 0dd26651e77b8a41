//! Page scroll lock as a scoped resource
//!
//! Anything that must keep the page still (a loader timeline, an optional
//! autoplay) holds a [`ScrollLockGuard`]. The page is locked while at least
//! one guard is alive; guards release on every exit path, including drop.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

#[derive(Debug, Default)]
struct LockInner {
    holders: Cell<usize>,
}

/// Shared page scroll lock
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    inner: Rc<LockInner>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a hold on the lock until the guard is dropped
    pub fn acquire(&self, owner: &'static str) -> ScrollLockGuard {
        let holders = self.inner.holders.get() + 1;
        self.inner.holders.set(holders);
        debug!(owner, holders, "Page scroll locked");
        ScrollLockGuard {
            inner: self.inner.clone(),
            owner,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.holders.get() > 0
    }

    pub fn holders(&self) -> usize {
        self.inner.holders.get()
    }
}

/// One hold on a [`ScrollLock`]
#[derive(Debug)]
pub struct ScrollLockGuard {
    inner: Rc<LockInner>,
    owner: &'static str,
}

impl ScrollLockGuard {
    /// Release explicitly; same as dropping
    pub fn release(self) {}

    pub fn owner(&self) -> &'static str {
        self.owner
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.inner.holders.get().saturating_sub(1);
        self.inner.holders.set(holders);
        debug!(owner = self.owner, holders, "Page scroll lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_counted() {
        let lock = ScrollLock::new();
        assert!(!lock.is_locked());

        let loader = lock.acquire("loader");
        let autoplay = lock.acquire("autoplay");
        assert_eq!(lock.holders(), 2);

        loader.release();
        assert!(lock.is_locked());

        drop(autoplay);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = ScrollLock::new();
        let view = lock.clone();
        let _guard = lock.acquire("reveal");
        assert!(view.is_locked());
    }
}
