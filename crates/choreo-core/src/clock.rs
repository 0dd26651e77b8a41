//! Process-wide frame scheduler
//!
//! The host (terminal loop, test, renderer) calls [`FrameClock::tick`] once
//! per display frame. Every subscriber sees the same monotonic timestamp,
//! in subscription order. With no subscribers the clock reports that it
//! does not want frames, so hosts can go idle instead of free-running.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{Error, Result};

/// What a subscriber wants after handling a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    /// Unsubscribe after this frame
    Done,
}

type FrameCallback = Box<dyn FnMut(Duration) -> Result<FrameControl>>;

struct Slot {
    id: u64,
    /// Taken out while the callback runs
    callback: Option<FrameCallback>,
}

struct ClockInner {
    slots: Vec<Slot>,
    next_id: u64,
    last: Option<Duration>,
    ticking: bool,
    frames: u64,
    origin: Instant,
}

impl ClockInner {
    fn take_slot(&mut self, id: u64) -> Option<FrameCallback> {
        let pos = self.slots.iter().position(|slot| slot.id == id)?;
        self.slots.remove(pos).callback
    }
}

thread_local! {
    static GLOBAL_CLOCK: FrameClock = FrameClock::new();
}

/// Cheaply cloneable handle to a frame scheduler
#[derive(Clone)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ClockInner {
                slots: Vec::new(),
                next_id: 1,
                last: None,
                ticking: false,
                frames: 0,
                origin: Instant::now(),
            })),
        }
    }

    /// The clock shared by everything on this thread
    pub fn global() -> Self {
        GLOBAL_CLOCK.with(|clock| clock.clone())
    }

    /// Register a per-frame callback; it runs until the returned handle is
    /// dropped, it returns [`FrameControl::Done`], or it fails
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Duration) -> Result<FrameControl> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            callback: Some(Box::new(callback)),
        });
        debug!(subscriber = id, total = inner.slots.len(), "Frame subscriber added");

        Subscription {
            id,
            clock: Rc::downgrade(&self.inner),
        }
    }

    /// True while at least one subscriber is registered
    #[inline]
    pub fn wants_frame(&self) -> bool {
        !self.inner.borrow().slots.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Timestamp of the most recent frame
    pub fn last_timestamp(&self) -> Option<Duration> {
        self.inner.borrow().last
    }

    /// Number of frames delivered so far
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// Deliver a frame stamped with the time elapsed since the clock was created
    pub fn tick_now(&self) -> Result<usize> {
        let now = self.inner.borrow().origin.elapsed();
        self.tick(now)
    }

    /// Deliver one frame to every current subscriber
    ///
    /// Returns how many subscribers ran. A timestamp older than the previous
    /// frame is clamped to it. Calling this from inside a subscriber is an
    /// error.
    pub fn tick(&self, timestamp: Duration) -> Result<usize> {
        let (ids, now) = {
            let mut inner = self.inner.borrow_mut();
            if inner.ticking {
                return Err(Error::ClockReentrancy);
            }
            if inner.slots.is_empty() {
                return Ok(0);
            }
            let now = match inner.last {
                Some(last) if timestamp < last => last,
                _ => timestamp,
            };
            inner.last = Some(now);
            inner.ticking = true;
            inner.frames += 1;
            let ids: Vec<u64> = inner.slots.iter().map(|slot| slot.id).collect();
            (ids, now)
        };

        let mut delivered = 0;
        for id in ids {
            // Unsubscribed earlier in this frame, or already running
            let callback = {
                let mut inner = self.inner.borrow_mut();
                inner
                    .slots
                    .iter_mut()
                    .find(|slot| slot.id == id)
                    .and_then(|slot| slot.callback.take())
            };
            let Some(mut callback) = callback else {
                continue;
            };

            let keep = match callback(now) {
                Ok(FrameControl::Continue) => true,
                Ok(FrameControl::Done) => false,
                Err(e) => {
                    warn!(subscriber = id, error = %e, "Frame subscriber failed, dropping it");
                    false
                }
            };
            delivered += 1;

            let leftover = {
                let mut inner = self.inner.borrow_mut();
                let pos = inner.slots.iter().position(|slot| slot.id == id);
                match pos {
                    Some(pos) if keep => {
                        inner.slots[pos].callback = Some(callback);
                        None
                    }
                    Some(pos) => {
                        inner.slots.remove(pos);
                        Some(callback)
                    }
                    None => Some(callback),
                }
            };
            // Dropped outside the borrow: captured state may own subscriptions
            drop(leftover);
        }

        self.inner.borrow_mut().ticking = false;
        Ok(delivered)
    }
}

/// Handle to a frame subscription; dropping it unsubscribes
pub struct Subscription {
    id: u64,
    clock: Weak<RefCell<ClockInner>>,
}

impl Subscription {
    /// Stop receiving frames
    pub fn unsubscribe(self) {}

    /// False once the subscriber was removed (by the handle, `Done` or failure)
    pub fn is_active(&self) -> bool {
        self.clock
            .upgrade()
            .map(|inner| inner.borrow().slots.iter().any(|slot| slot.id == self.id))
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.clock.upgrade() {
            let removed = inner.borrow_mut().take_slot(self.id);
            drop(removed);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_delivers_in_subscription_order() {
        let clock = FrameClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = log.clone();
            clock.subscribe(move |now| {
                log.borrow_mut().push(("a", now));
                Ok(FrameControl::Continue)
            })
        };
        let second = {
            let log = log.clone();
            clock.subscribe(move |now| {
                log.borrow_mut().push(("b", now));
                Ok(FrameControl::Continue)
            })
        };

        assert_eq!(clock.tick(ms(16)).unwrap(), 2);
        assert_eq!(*log.borrow(), vec![("a", ms(16)), ("b", ms(16))]);
        drop((first, second));
    }

    #[test]
    fn test_global_clock_is_shared_per_thread() {
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let _sub = FrameClock::global().subscribe(move |_| {
            counter.set(counter.get() + 1);
            Ok(FrameControl::Continue)
        });

        let clock = FrameClock::global();
        assert_eq!(clock.subscriber_count(), 1);
        clock.tick(ms(16)).unwrap();
        assert_eq!(seen.get(), 1);

        let other = std::thread::spawn(|| FrameClock::global().subscriber_count())
            .join()
            .unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn test_idle_without_subscribers() {
        let clock = FrameClock::new();
        assert!(!clock.wants_frame());
        assert_eq!(clock.tick(ms(16)).unwrap(), 0);
        assert_eq!(clock.frames(), 0);

        let sub = clock.subscribe(|_| Ok(FrameControl::Continue));
        assert!(clock.wants_frame());
        sub.unsubscribe();
        assert!(!clock.wants_frame());
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let clock = FrameClock::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            clock.subscribe(move |now| {
                seen.borrow_mut().push(now);
                Ok(FrameControl::Continue)
            })
        };

        clock.tick(ms(100)).unwrap();
        clock.tick(ms(50)).unwrap();
        clock.tick(ms(120)).unwrap();
        assert_eq!(*seen.borrow(), vec![ms(100), ms(100), ms(120)]);
    }

    #[test]
    fn test_done_unsubscribes() {
        let clock = FrameClock::new();
        let count = Rc::new(Cell::new(0));
        let sub = {
            let count = count.clone();
            clock.subscribe(move |_| {
                count.set(count.get() + 1);
                Ok(FrameControl::Done)
            })
        };

        clock.tick(ms(1)).unwrap();
        clock.tick(ms(2)).unwrap();
        assert_eq!(count.get(), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_failing_subscriber_does_not_block_others() {
        let clock = FrameClock::new();
        let count = Rc::new(Cell::new(0));

        let _bad = clock.subscribe(|_| Err(Error::Subscriber("boom".into())));
        let _good = {
            let count = count.clone();
            clock.subscribe(move |_| {
                count.set(count.get() + 1);
                Ok(FrameControl::Continue)
            })
        };

        assert_eq!(clock.tick(ms(1)).unwrap(), 2);
        assert_eq!(clock.subscriber_count(), 1);
        assert_eq!(clock.tick(ms(2)).unwrap(), 1);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_reentrant_subscribe_and_unsubscribe() {
        let clock = FrameClock::new();
        let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let spawned: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        // "a" removes "b" and adds "c" during the first frame
        let _a = {
            let clock = clock.clone();
            let log = log.clone();
            let victim = victim.clone();
            let spawned = spawned.clone();
            clock.clone().subscribe(move |_| {
                log.borrow_mut().push("a");
                victim.borrow_mut().take();
                if spawned.borrow().is_empty() {
                    let log = log.clone();
                    let sub = clock.subscribe(move |_| {
                        log.borrow_mut().push("c");
                        Ok(FrameControl::Continue)
                    });
                    spawned.borrow_mut().push(sub);
                }
                Ok(FrameControl::Continue)
            })
        };
        let b = {
            let log = log.clone();
            clock.subscribe(move |_| {
                log.borrow_mut().push("b");
                Ok(FrameControl::Continue)
            })
        };
        *victim.borrow_mut() = Some(b);

        clock.tick(ms(1)).unwrap();
        assert_eq!(*log.borrow(), vec!["a"]);

        clock.tick(ms(2)).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "a", "c"]);
    }

    #[test]
    fn test_tick_inside_subscriber_is_rejected() {
        let clock = FrameClock::new();
        let result = Rc::new(RefCell::new(None));
        let _sub = {
            let clock = clock.clone();
            let result = result.clone();
            clock.clone().subscribe(move |now| {
                *result.borrow_mut() = Some(clock.tick(now).is_err());
                Ok(FrameControl::Continue)
            })
        };

        clock.tick(ms(1)).unwrap();
        assert_eq!(*result.borrow(), Some(true));
    }
}
