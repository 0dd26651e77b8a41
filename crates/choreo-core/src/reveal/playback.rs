use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tokio::sync::oneshot;

use super::phase::{RevealOptions, RevealPhase};
use super::timeline::{RevealFrame, RevealState, RevealTimeline};
use crate::clock::{FrameClock, FrameControl, Subscription};

/// Play `phases` on `clock`, one advance per frame
pub fn play_reveal_timeline(
    clock: &FrameClock,
    phases: Vec<RevealPhase>,
    options: RevealOptions,
) -> RevealPlayback {
    RevealPlayback::start(clock, RevealTimeline::new(phases, options))
}

/// A timeline subscribed to a frame clock
///
/// Dropping the playback cancels it.
pub struct RevealPlayback {
    timeline: Rc<RefCell<RevealTimeline>>,
    subscription: RefCell<Option<Subscription>>,
    completion: Option<oneshot::Receiver<()>>,
}

impl RevealPlayback {
    /// Subscribe an already-built timeline, e.g. one with an
    /// `on_complete` callback attached
    pub fn start(clock: &FrameClock, mut timeline: RevealTimeline) -> Self {
        let completion = timeline.completion_channel();
        let timeline = Rc::new(RefCell::new(timeline));
        let weak = Rc::downgrade(&timeline);
        let subscription = clock.subscribe(move |now| {
            let Some(timeline) = weak.upgrade() else {
                return Ok(FrameControl::Done);
            };
            let fired = timeline.borrow_mut().advance(now);
            fired.run();
            if timeline.borrow().is_finished() {
                Ok(FrameControl::Done)
            } else {
                Ok(FrameControl::Continue)
            }
        });
        Self {
            timeline,
            subscription: RefCell::new(Some(subscription)),
            completion: Some(completion),
        }
    }

    /// Resolves with `Ok(())` on completion and with an error once the
    /// playback is cancelled. Available once.
    pub fn completion(&mut self) -> Option<oneshot::Receiver<()>> {
        self.completion.take()
    }

    pub fn cancel(&self) {
        self.timeline.borrow_mut().cancel();
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }

    pub fn state(&self) -> RevealState {
        self.timeline.borrow().state()
    }

    pub fn is_finished(&self) -> bool {
        self.timeline.borrow().is_finished()
    }

    pub fn frame(&self) -> RevealFrame {
        self.timeline.borrow().frame()
    }

    /// Weak handle an owner can use to cancel this playback on teardown
    pub fn canceller(&self) -> RevealCanceller {
        RevealCanceller(Rc::downgrade(&self.timeline))
    }
}

impl Drop for RevealPlayback {
    fn drop(&mut self) {
        if let Ok(mut timeline) = self.timeline.try_borrow_mut() {
            timeline.cancel();
        }
    }
}

impl std::fmt::Debug for RevealPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealPlayback")
            .field("state", &self.state())
            .finish()
    }
}

/// Cancels a playback if it is still alive
#[derive(Debug, Clone)]
pub struct RevealCanceller(Weak<RefCell<RevealTimeline>>);

impl RevealCanceller {
    pub fn cancel(&self) {
        if let Some(timeline) = self.0.upgrade() {
            if let Ok(mut timeline) = timeline.try_borrow_mut() {
                timeline.cancel();
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0
            .upgrade()
            .is_some_and(|timeline| !timeline.borrow().is_finished())
    }
}
