//! Per-container scroll controller
//!
//! One controller owns everything that moves or watches a single scrollable
//! container: the smoother, its trigger registry, at most one autoplay, the
//! visibility field and any reveal playbacks attached to it. Input arrives as
//! [`ContainerEvent`] messages and is applied on the next frame, in this order:
//!
//! 1. drain the mailbox
//! 2. poll idle deadlines
//! 3. update the position once
//! 4. observe triggers against the new viewport
//! 5. recompute visibility
//! 6. publish the snapshot
//!
//! The controller stays subscribed to its frame clock only while it has
//! work, so an idle page lets the host stop scheduling frames.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::autoplay::{Autoplay, AutoplayOptions, AutoplayState, Interaction};
use crate::clock::{FrameClock, FrameControl, Subscription};
use crate::config::{ChoreoConfig, ReducedMotion, ScrollConfig};
use crate::geometry::{Extent, Rect};
use crate::ids::{ContainerId, ElementId};
use crate::lock::ScrollLock;
use crate::reveal::{RevealCanceller, RevealPlayback};
use crate::scroll::{Easing, ScrollSmoother, ScrollTarget};
use crate::trigger::{InViewFlag, TriggerEvent, TriggerHandle, TriggerOptions, TriggerRegistry};
use crate::visibility::{VisibilityEntry, VisibilityField, VisibilityPolicy};
use crate::{Error, Result};

/// Measured size of a container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    pub content_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
}

impl ContainerMetrics {
    pub fn new(content_height: f64, viewport_height: f64, viewport_width: f64) -> Self {
        Self {
            content_height,
            viewport_height,
            viewport_width,
        }
    }
}

/// Input forwarded by the view layer
#[derive(Debug, Clone)]
pub enum ContainerEvent {
    Wheel { delta: f64 },
    /// Position reported by native scrolling
    NativeScroll { position: f64 },
    PointerEnter,
    PointerLeave,
    /// Pointer moved; `y` is relative to the viewport top
    PointerMove { y: f64 },
    Focus,
    Blur,
    TouchMove { delta: f64 },
    Resize {
        content_height: f64,
        viewport_height: f64,
        viewport_width: f64,
    },
    /// The host's reduced-motion preference changed
    ReducedMotionChanged(bool),
    /// The container scrolled into or out of the page viewport
    Visibility(bool),
    ScrollTo {
        position: f64,
        duration: Option<Duration>,
        easing: Option<Easing>,
    },
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub scroll: ScrollConfig,
    pub visibility: VisibilityPolicy,
    pub reduced_motion: ReducedMotion,
    /// Host preference at mount time
    pub host_prefers_reduced: bool,
    /// User scroll input is ignored while this lock is held
    pub input_lock: Option<ScrollLock>,
    /// Lock an autoplay may hold while it runs
    pub page_lock: Option<ScrollLock>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            visibility: VisibilityPolicy::default(),
            reduced_motion: ReducedMotion::default(),
            host_prefers_reduced: false,
            input_lock: None,
            page_lock: None,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &ChoreoConfig) -> Result<Self> {
        Ok(Self {
            scroll: config.scroll.clone(),
            visibility: VisibilityPolicy::from_config(&config.visibility)?,
            reduced_motion: config.autoplay.reduced_motion,
            ..Self::default()
        })
    }

    pub fn with_input_lock(mut self, lock: ScrollLock) -> Self {
        self.input_lock = Some(lock);
        self
    }

    pub fn with_page_lock(mut self, lock: ScrollLock) -> Self {
        self.page_lock = Some(lock);
        self
    }

    pub fn validated(self) -> Result<Self> {
        let lerp = self.scroll.lerp;
        if !(lerp > 0.0 && lerp <= 1.0) {
            return Err(Error::invalid_option("lerp", format!("{lerp} is not in (0, 1]")));
        }
        self.visibility.validated()?;
        Ok(self)
    }
}

/// Published state of a controller after its last frame
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub scroll: ScrollTarget,
    pub autoplay: Option<AutoplayState>,
    pub visibility: Vec<VisibilityEntry>,
    /// Unit closest to full opacity
    pub focused: Option<usize>,
    pub in_view: bool,
    pub reduced_motion: bool,
    pub frame: Option<Duration>,
}

struct ControllerState {
    mailbox: mpsc::UnboundedReceiver<ContainerEvent>,
    smoother: ScrollSmoother,
    metrics: ContainerMetrics,
    autoplay: Option<Autoplay>,
    autoplay_generation: u64,
    visibility: VisibilityField,
    reduced_motion: ReducedMotion,
    host_prefers_reduced: bool,
    in_view: bool,
    input_lock: Option<ScrollLock>,
    page_lock: Option<ScrollLock>,
    reveals: Vec<RevealCanceller>,
    snapshot: ControllerSnapshot,
    destroyed: bool,
}

impl ControllerState {
    fn reduced(&self) -> bool {
        self.reduced_motion.resolve(self.host_prefers_reduced)
    }

    fn input_locked(&self) -> bool {
        self.input_lock.as_ref().is_some_and(ScrollLock::is_locked)
    }

    fn root(&self) -> Rect {
        Rect::new(
            0.0,
            self.smoother.position(),
            self.metrics.viewport_width,
            self.metrics.viewport_height,
        )
    }

    fn interact(&mut self, interaction: Interaction, now: Duration) {
        if let Some(autoplay) = self.autoplay.as_mut() {
            autoplay.interact(interaction, now);
        }
    }

    fn handle(&mut self, event: ContainerEvent, now: Duration) {
        trace!(?event, "Container event");
        match event {
            ContainerEvent::Wheel { delta } => {
                if self.input_locked() {
                    trace!("Wheel ignored while page scroll is locked");
                    return;
                }
                self.smoother.scroll_by(delta);
                self.interact(Interaction::Wheel, now);
            }
            ContainerEvent::TouchMove { delta } => {
                if self.input_locked() {
                    return;
                }
                self.smoother.scroll_by(delta);
                self.interact(Interaction::TouchMove, now);
            }
            ContainerEvent::NativeScroll { position } => {
                if !self.input_locked() {
                    self.smoother.set_native(position);
                }
            }
            ContainerEvent::PointerEnter => self.interact(Interaction::PointerEnter, now),
            ContainerEvent::PointerLeave => self.interact(Interaction::PointerLeave, now),
            ContainerEvent::PointerMove { y } => {
                let height = self.metrics.viewport_height;
                let fraction = if height > 0.0 { y / height } else { 0.5 };
                self.interact(Interaction::PointerMove { fraction }, now);
            }
            ContainerEvent::Focus => self.interact(Interaction::Focus, now),
            ContainerEvent::Blur => self.interact(Interaction::Blur, now),
            ContainerEvent::Resize {
                content_height,
                viewport_height,
                viewport_width,
            } => {
                self.metrics = ContainerMetrics::new(content_height, viewport_height, viewport_width);
                self.smoother.set_bounds(content_height, viewport_height);
                debug!(max = self.smoother.max(), "Container resized");
            }
            ContainerEvent::ReducedMotionChanged(prefers) => {
                self.host_prefers_reduced = prefers;
                let (position, max) = (self.smoother.position(), self.smoother.max());
                if let Some(autoplay) = self.autoplay.as_mut() {
                    autoplay.set_motion_preference(prefers, position, max);
                }
                debug!(reduced = self.reduced(), "Reduced motion preference changed");
            }
            ContainerEvent::Visibility(in_view) => {
                self.in_view = in_view;
                if let Some(autoplay) = self.autoplay.as_mut() {
                    autoplay.set_in_view(in_view);
                }
            }
            ContainerEvent::ScrollTo {
                position,
                duration,
                easing,
            } => {
                let config = self.smoother.config();
                let duration = if self.reduced() {
                    Duration::ZERO
                } else {
                    duration.unwrap_or(Duration::from_millis(config.scroll_to_duration_ms))
                };
                let easing = easing.unwrap_or_else(|| config.easing.into());
                self.smoother.scroll_to(position, duration, easing);
            }
        }
    }

    /// Steps 1 to 3 of a frame; returns the root to observe
    fn begin_frame(&mut self, now: Duration) -> Rect {
        while let Ok(event) = self.mailbox.try_recv() {
            self.handle(event, now);
        }

        let (position, max) = (self.smoother.position(), self.smoother.max());
        if let Some(autoplay) = self.autoplay.as_mut() {
            autoplay.poll(now, position, max);
        }

        if self.smoother.needs_update() {
            self.smoother.tick(now);
        } else if let Some(next) = self
            .autoplay
            .as_mut()
            .and_then(|autoplay| autoplay.step(now, position, max))
        {
            self.smoother.jump_to(next);
        }
        self.root()
    }

    /// Steps 5 and 6; returns whether another frame is needed
    fn end_frame(&mut self, now: Duration) -> bool {
        let reduced = self.reduced();
        let viewport = Extent::new(self.smoother.position(), self.metrics.viewport_height);
        let visibility = self.visibility.recompute(viewport, reduced).to_vec();
        self.snapshot = ControllerSnapshot {
            scroll: self.smoother.snapshot(),
            autoplay: self.autoplay.as_ref().map(Autoplay::state),
            visibility,
            focused: self.visibility.focused(),
            in_view: self.in_view,
            reduced_motion: reduced,
            frame: Some(now),
        };
        self.has_work()
    }

    fn has_work(&self) -> bool {
        if self.destroyed {
            return false;
        }
        let autoplay_busy = self
            .autoplay
            .as_ref()
            .is_some_and(|autoplay| autoplay.is_moving() || autoplay.is_waiting());
        !self.mailbox.is_empty() || self.smoother.needs_update() || autoplay_busy
    }

    fn status_text(&self) -> String {
        self.autoplay
            .as_ref()
            .map(Autoplay::status_text)
            .unwrap_or_default()
    }
}

struct Shared {
    id: ContainerId,
    clock: FrameClock,
    state: RefCell<ControllerState>,
    registry: TriggerRegistry,
    tx: mpsc::UnboundedSender<ContainerEvent>,
    status: watch::Sender<String>,
    subscription: RefCell<Option<Subscription>>,
}

impl Shared {
    fn enqueue(self: &Rc<Self>, event: ContainerEvent) {
        if self.state.borrow().destroyed {
            trace!(container = %self.id, ?event, "Event for destroyed container dropped");
            return;
        }
        if self.tx.send(event).is_ok() {
            self.ensure_subscribed();
        }
    }

    fn ensure_subscribed(self: &Rc<Self>) {
        let active = self
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_active);
        if active || self.state.borrow().destroyed {
            return;
        }
        let weak = Rc::downgrade(self);
        let subscription = self.clock.subscribe(move |now| match weak.upgrade() {
            Some(shared) => shared.frame(now),
            None => Ok(FrameControl::Done),
        });
        let stale = self.subscription.borrow_mut().replace(subscription);
        drop(stale);
    }

    fn frame(&self, now: Duration) -> Result<FrameControl> {
        let root = {
            let mut state = self
                .state
                .try_borrow_mut()
                .map_err(|e| Error::Subscriber(format!("controller {} busy: {e}", self.id)))?;
            if state.destroyed {
                return Ok(FrameControl::Done);
            }
            state.begin_frame(now)
        };

        // Trigger callbacks may call back into the controller
        self.registry.observe(root);

        let more = self.state.borrow_mut().end_frame(now);
        self.publish_status();
        Ok(if more {
            FrameControl::Continue
        } else {
            FrameControl::Done
        })
    }

    fn publish_status(&self) {
        let text = self.state.borrow().status_text();
        self.status.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }
}

/// Owner of one scrollable container's choreography
///
/// Dropping the controller destroys it.
pub struct ScrollController {
    shared: Rc<Shared>,
}

impl ScrollController {
    pub fn create(
        clock: &FrameClock,
        id: ContainerId,
        metrics: ContainerMetrics,
        options: ControllerOptions,
    ) -> Result<Self> {
        let options = options.validated()?;
        let mut smoother = ScrollSmoother::new(id, options.scroll);
        smoother.set_bounds(metrics.content_height, metrics.viewport_height);
        let (tx, mailbox) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(String::new());
        let reduced = options.reduced_motion.resolve(options.host_prefers_reduced);

        let state = ControllerState {
            mailbox,
            snapshot: ControllerSnapshot {
                scroll: smoother.snapshot(),
                autoplay: None,
                visibility: Vec::new(),
                focused: None,
                in_view: true,
                reduced_motion: reduced,
                frame: None,
            },
            smoother,
            metrics,
            autoplay: None,
            autoplay_generation: 0,
            visibility: VisibilityField::new(options.visibility),
            reduced_motion: options.reduced_motion,
            host_prefers_reduced: options.host_prefers_reduced,
            in_view: true,
            input_lock: options.input_lock,
            page_lock: options.page_lock,
            reveals: Vec::new(),
            destroyed: false,
        };

        debug!(container = %id, max = state.smoother.max(), "Scroll controller created");
        let shared = Rc::new(Shared {
            id,
            clock: clock.clone(),
            state: RefCell::new(state),
            registry: TriggerRegistry::new(),
            tx,
            status,
            subscription: RefCell::new(None),
        });
        shared.ensure_subscribed();
        Ok(Self { shared })
    }

    pub fn id(&self) -> ContainerId {
        self.shared.id
    }

    /// Queue an input event for the next frame
    pub fn send(&self, event: ContainerEvent) {
        self.shared.enqueue(event);
    }

    /// Animate to `position`; `None` falls back to the configured duration
    /// and easing. Jumps when reduced motion is in effect.
    pub fn scroll_to(&self, position: f64, duration: Option<Duration>, easing: Option<Easing>) {
        self.send(ContainerEvent::ScrollTo {
            position,
            duration,
            easing,
        });
    }

    pub fn position(&self) -> f64 {
        self.shared.state.borrow().smoother.position()
    }

    pub fn max(&self) -> f64 {
        self.shared.state.borrow().smoother.max()
    }

    pub fn metrics(&self) -> ContainerMetrics {
        self.shared.state.borrow().metrics
    }

    /// Live autoplay status text; empty while no autoplay is attached
    pub fn status(&self) -> watch::Receiver<String> {
        self.shared.status.subscribe()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.shared.state.borrow().snapshot.clone()
    }

    pub fn autoplay_state(&self) -> Option<AutoplayState> {
        self.shared
            .state
            .borrow()
            .autoplay
            .as_ref()
            .map(Autoplay::state)
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.shared.registry
    }

    /// True while the controller is subscribed to its clock
    pub fn is_active(&self) -> bool {
        self.shared
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.state.borrow().destroyed
    }

    pub fn register_trigger<E, L>(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
        on_enter: E,
        on_leave: L,
    ) -> TriggerHandle
    where
        E: FnMut(&TriggerEvent) + 'static,
        L: FnMut(&TriggerEvent) + 'static,
    {
        let handle = self
            .shared
            .registry
            .register(element, rect, options, on_enter, on_leave);
        self.shared.ensure_subscribed();
        handle
    }

    /// Scroll so `element`'s top sits `offset` below the viewport top each
    /// time it enters
    pub fn anchor_element(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
        offset: f64,
    ) -> TriggerHandle {
        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let handle = self
            .shared
            .registry
            .anchor(element, rect, options, offset, move |position| {
                if let Some(shared) = weak.upgrade() {
                    debug!(%element, position, "Anchoring section");
                    shared.enqueue(ContainerEvent::ScrollTo {
                        position,
                        duration: None,
                        easing: None,
                    });
                }
            });
        self.shared.ensure_subscribed();
        handle
    }

    pub fn track_in_view(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
    ) -> (TriggerHandle, InViewFlag) {
        let tracked = self.shared.registry.track_in_view(element, rect, options);
        self.shared.ensure_subscribed();
        tracked
    }

    pub fn update_rect(&self, element: ElementId, rect: Rect) {
        self.shared.registry.update_rect(element, rect);
        self.shared.ensure_subscribed();
    }

    /// Replace the units whose visibility is tracked
    pub fn set_units(&self, units: Vec<Extent>) {
        self.shared.state.borrow_mut().visibility.set_units(units);
        self.shared.ensure_subscribed();
    }

    pub fn visibility(&self) -> Vec<VisibilityEntry> {
        self.shared.state.borrow().visibility.entries().to_vec()
    }

    /// Cancel `playback` when this controller is destroyed
    pub fn attach_reveal(&self, playback: &RevealPlayback) {
        let mut state = self.shared.state.borrow_mut();
        state.reveals.retain(RevealCanceller::is_alive);
        state.reveals.push(playback.canceller());
    }

    /// Start autoplay, replacing any autoplay already running here
    pub fn start_autoplay(&self, options: AutoplayOptions) -> Result<AutoplayHandle> {
        let options = options.validated()?;
        let generation = {
            let mut state = self.shared.state.borrow_mut();
            if state.destroyed {
                return Err(Error::Other(format!("container {} is destroyed", self.shared.id)));
            }
            // Stop before start, so a page lock hold is handed over rather than doubled
            if let Some(superseded) = state.autoplay.take() {
                debug!(container = %self.shared.id, state = %superseded.state(), "Autoplay superseded");
            }
            let mut autoplay = Autoplay::new(options, state.host_prefers_reduced);
            if let Some(lock) = state.page_lock.clone() {
                autoplay = autoplay.with_page_lock(lock);
            }
            autoplay.set_in_view(state.in_view);
            state.autoplay = Some(autoplay);
            state.autoplay_generation += 1;
            state.autoplay_generation
        };
        self.shared.publish_status();
        self.shared.ensure_subscribed();
        Ok(AutoplayHandle {
            shared: Rc::downgrade(&self.shared),
            generation,
        })
    }

    /// Tear everything down: in-flight animations, autoplay and its idle
    /// deadline, every trigger and any attached reveal (without completion)
    pub fn destroy(&self) {
        let (autoplay, reveals, subscription) = {
            let Ok(mut state) = self.shared.state.try_borrow_mut() else {
                return;
            };
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.smoother.cancel();
            let autoplay = state.autoplay.take();
            let reveals = std::mem::take(&mut state.reveals);
            (autoplay, reveals, self.shared.subscription.borrow_mut().take())
        };
        drop(autoplay);
        for reveal in &reveals {
            reveal.cancel();
        }
        drop(subscription);
        self.shared.registry.clear();
        self.shared.publish_status();
        debug!(container = %self.shared.id, "Scroll controller destroyed");
    }
}

impl Drop for ScrollController {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for ScrollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollController")
            .field("id", &self.shared.id)
            .field("triggers", &self.shared.registry.len())
            .finish()
    }
}

/// Control over one autoplay instance
///
/// Inert once the autoplay is superseded, destroyed, or its controller is gone.
#[derive(Debug, Clone)]
pub struct AutoplayHandle {
    shared: Weak<Shared>,
    generation: u64,
}

impl AutoplayHandle {
    fn with_current<R>(&self, f: impl FnOnce(&mut Autoplay, &ScrollSmoother) -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        let result = {
            let mut state = shared.state.borrow_mut();
            if state.autoplay_generation != self.generation {
                return None;
            }
            let ControllerState {
                autoplay, smoother, ..
            } = &mut *state;
            autoplay.as_mut().map(|autoplay| f(autoplay, smoother))
        };
        shared.publish_status();
        shared.ensure_subscribed();
        result
    }

    /// Suspend as on pointer enter; motion returns after the idle timeout
    pub fn pause(&self) {
        self.with_current(|autoplay, _| autoplay.pause());
    }

    /// Release as on pointer leave; restarts the idle timer
    pub fn resume(&self) {
        self.with_current(|autoplay, _| autoplay.resume());
    }

    /// Suspend until [`resume_now`](Self::resume_now)
    pub fn hold(&self) {
        self.with_current(|autoplay, _| autoplay.hold());
    }

    pub fn resume_now(&self) {
        self.with_current(|autoplay, smoother| {
            autoplay.resume_now(smoother.position(), smoother.max())
        });
    }

    pub fn state(&self) -> Option<AutoplayState> {
        self.with_current(|autoplay, _| autoplay.state())
    }

    /// Whether this handle still controls the container's autoplay
    pub fn is_current(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| {
            let state = shared.state.borrow();
            state.autoplay_generation == self.generation && state.autoplay.is_some()
        })
    }

    /// Stop this autoplay; the container keeps its position
    pub fn destroy(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let removed = {
            let mut state = shared.state.borrow_mut();
            if state.autoplay_generation != self.generation {
                return;
            }
            state.autoplay.take()
        };
        drop(removed);
        shared.publish_status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::{play_reveal_timeline, RevealOptions, RevealPhase, RevealState};
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        clock: FrameClock,
        now: Duration,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: FrameClock::new(),
                now: Duration::ZERO,
            }
        }

        fn frames(&mut self, count: u32) {
            for _ in 0..count {
                self.now += FRAME;
                self.clock.tick(self.now).unwrap();
            }
        }

        fn advance(&mut self, by: Duration) {
            let end = self.now + by;
            while self.now < end {
                self.frames(1);
            }
        }

        fn controller(&self, content: f64, viewport: f64) -> ScrollController {
            ScrollController::create(
                &self.clock,
                ContainerId::new(),
                ContainerMetrics::new(content, viewport, 80.0),
                ControllerOptions::default(),
            )
            .unwrap()
        }
    }

    fn autoplay_options() -> AutoplayOptions {
        AutoplayOptions {
            reduced_motion: ReducedMotion::Off,
            ..AutoplayOptions::default()
        }
    }

    #[test]
    fn test_autoplay_advances_half_unit_per_frame() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        assert_eq!(controller.max(), 1000.0);
        controller.start_autoplay(autoplay_options()).unwrap();

        h.frames(100);
        assert!((controller.position() - 50.0).abs() < 1e-9);
        assert_eq!(
            *controller.status().borrow(),
            AutoplayState::Running.status_text()
        );
    }

    #[test]
    fn test_pointer_enter_freezes_for_idle_timeout() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(10);

        controller.send(ContainerEvent::PointerEnter);
        h.frames(1);
        let frozen = controller.position();
        assert_eq!(controller.autoplay_state(), Some(AutoplayState::SuspendedByUser));

        h.advance(Duration::from_millis(2900));
        assert_eq!(controller.position(), frozen);

        h.advance(Duration::from_millis(200));
        assert_eq!(controller.autoplay_state(), Some(AutoplayState::Running));
        assert!(controller.position() > frozen);
    }

    #[test]
    fn test_handle_pause_resumes_after_idle_timeout() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        let handle = controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(10);

        handle.pause();
        assert_eq!(handle.state(), Some(AutoplayState::SuspendedByUser));
        h.frames(1);
        let frozen = controller.position();
        assert!(h.clock.wants_frame());

        h.advance(Duration::from_millis(2900));
        assert_eq!(controller.position(), frozen);
        assert_eq!(handle.state(), Some(AutoplayState::SuspendedByUser));

        h.advance(Duration::from_millis(200));
        assert_eq!(handle.state(), Some(AutoplayState::Running));
        assert!(controller.position() > frozen);
    }

    #[test]
    fn test_handle_resume_rearms_idle_timer() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        let handle = controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(10);

        handle.pause();
        h.advance(Duration::from_millis(2000));
        handle.resume();
        h.advance(Duration::from_millis(2000));
        assert_eq!(handle.state(), Some(AutoplayState::SuspendedByUser));

        h.advance(Duration::from_millis(1100));
        assert_eq!(handle.state(), Some(AutoplayState::Running));
    }

    #[test]
    fn test_handle_hold_stays_until_resume_now() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        let handle = controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(10);

        handle.hold();
        h.frames(1);
        let held = controller.position();
        assert!(!h.clock.wants_frame());
        h.advance(Duration::from_secs(10));
        assert_eq!(controller.position(), held);

        handle.resume_now();
        assert_eq!(handle.state(), Some(AutoplayState::Running));
        h.frames(10);
        assert!(controller.position() > held);
    }

    #[test]
    fn test_reduced_motion_stops_same_frame_and_goes_idle() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(10);

        // An `auto` autoplay follows the host preference
        let handle = controller
            .start_autoplay(AutoplayOptions::default())
            .unwrap();
        controller.send(ContainerEvent::ReducedMotionChanged(true));
        h.frames(1);
        let stopped = controller.position();
        assert_eq!(handle.state(), Some(AutoplayState::SuspendedByMotionPreference));

        h.frames(50);
        assert_eq!(controller.position(), stopped);
        assert!(!h.clock.wants_frame());
        assert_eq!(
            *controller.status().borrow(),
            "Auto-scrolling disabled due to reduced motion preference."
        );
    }

    #[test]
    fn test_second_autoplay_supersedes_first() {
        let h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        let first = controller.start_autoplay(autoplay_options()).unwrap();
        let second = controller.start_autoplay(autoplay_options()).unwrap();

        assert!(!first.is_current());
        assert!(second.is_current());

        first.pause();
        assert_eq!(second.state(), Some(AutoplayState::Running));
        second.pause();
        assert_eq!(controller.autoplay_state(), Some(AutoplayState::SuspendedByUser));
    }

    #[test]
    fn test_autoplay_lock_released_on_supersede_and_destroy() {
        let h = Harness::new();
        let lock = ScrollLock::new();
        let controller = ScrollController::create(
            &h.clock,
            ContainerId::new(),
            ContainerMetrics::new(2000.0, 1000.0, 80.0),
            ControllerOptions::default().with_page_lock(lock.clone()),
        )
        .unwrap();
        let options = AutoplayOptions {
            lock_page_scroll: true,
            ..autoplay_options()
        };
        controller.start_autoplay(options.clone()).unwrap();
        controller.start_autoplay(options).unwrap();
        assert_eq!(lock.holders(), 1);

        controller.destroy();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_scroll_to_stays_in_bounds() {
        let mut h = Harness::new();
        let controller = h.controller(1500.0, 500.0);
        controller.scroll_to(5000.0, Some(Duration::from_millis(200)), None);
        for _ in 0..30 {
            h.frames(1);
            let position = controller.position();
            assert!((0.0..=1000.0).contains(&position));
        }
        assert_eq!(controller.position(), 1000.0);

        controller.scroll_to(-20.0, Some(Duration::from_millis(100)), None);
        h.frames(20);
        assert_eq!(controller.position(), 0.0);
    }

    #[test]
    fn test_wheel_ignored_while_input_locked() {
        let mut h = Harness::new();
        let lock = ScrollLock::new();
        let controller = ScrollController::create(
            &h.clock,
            ContainerId::new(),
            ContainerMetrics::new(2000.0, 1000.0, 80.0),
            ControllerOptions::default().with_input_lock(lock.clone()),
        )
        .unwrap();

        let guard = lock.acquire("loader");
        controller.send(ContainerEvent::Wheel { delta: 300.0 });
        h.frames(60);
        assert_eq!(controller.position(), 0.0);

        guard.release();
        controller.send(ContainerEvent::Wheel { delta: 300.0 });
        h.frames(200);
        assert!((controller.position() - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_anchor_scrolls_section_into_place() {
        let mut h = Harness::new();
        let controller = h.controller(3000.0, 500.0);
        let _anchor = controller.anchor_element(
            ElementId(1),
            Rect::new(0.0, 700.0, 80.0, 400.0),
            TriggerOptions::new(0.3, "0px").unwrap(),
            40.0,
        );

        controller.send(ContainerEvent::NativeScroll { position: 450.0 });
        h.advance(Duration::from_millis(1600));
        assert!((controller.position() - 660.0).abs() < 1e-6);
    }

    #[test]
    fn test_visibility_snapshot_follows_scroll() {
        let mut h = Harness::new();
        let controller = h.controller(400.0, 200.0);
        controller.set_units(Extent::stack(&[100.0, 100.0, 100.0, 100.0], 0.0));
        h.frames(1);
        assert_eq!(controller.snapshot().focused, Some(0));

        controller.send(ContainerEvent::NativeScroll { position: 200.0 });
        h.frames(1);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.scroll.current, 200.0);
        assert!(!snapshot.visibility[0].visible);
        assert!(snapshot.visibility[3].visible);
    }

    #[test]
    fn test_destroy_tears_everything_down() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        let entered = Rc::new(Cell::new(0));
        let trigger = {
            let entered = entered.clone();
            controller.register_trigger(
                ElementId(5),
                Rect::new(0.0, 100.0, 80.0, 100.0),
                TriggerOptions::default(),
                move |_| entered.set(entered.get() + 1),
                |_| {},
            )
        };
        let autoplay = controller.start_autoplay(autoplay_options()).unwrap();
        let reveal = play_reveal_timeline(
            &h.clock,
            vec![RevealPhase::from_text("loading", Duration::from_millis(700))],
            RevealOptions::default(),
        );
        controller.attach_reveal(&reveal);
        controller.scroll_to(900.0, None, None);
        h.frames(2);
        assert_eq!(entered.get(), 1);

        controller.destroy();
        let position = controller.position();
        h.frames(100);

        assert_eq!(controller.position(), position);
        assert!(!trigger.is_registered());
        assert!(!autoplay.is_current());
        assert_eq!(reveal.state(), RevealState::Cancelled);
        assert!(!h.clock.wants_frame());
        assert!(controller.start_autoplay(autoplay_options()).is_err());
    }

    #[test]
    fn test_zero_range_container_is_inert() {
        let mut h = Harness::new();
        let controller = h.controller(300.0, 500.0);
        controller.start_autoplay(autoplay_options()).unwrap();
        controller.send(ContainerEvent::Wheel { delta: 50.0 });
        controller.scroll_to(100.0, None, None);
        h.frames(20);
        assert_eq!(controller.position(), 0.0);
    }

    #[test]
    fn test_dropped_controller_unsubscribes() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        controller.start_autoplay(autoplay_options()).unwrap();
        h.frames(1);
        assert!(h.clock.wants_frame());

        drop(controller);
        assert!(!h.clock.wants_frame());
        h.frames(1);
    }

    #[test]
    fn test_idle_controller_releases_the_clock() {
        let mut h = Harness::new();
        let controller = h.controller(2000.0, 1000.0);
        h.frames(2);
        assert!(!controller.is_active());
        assert!(!h.clock.wants_frame());

        controller.send(ContainerEvent::Wheel { delta: 10.0 });
        assert!(controller.is_active());
    }

    #[test]
    fn test_invalid_lerp_rejected() {
        let clock = FrameClock::new();
        let mut options = ControllerOptions::default();
        options.scroll.lerp = 0.0;
        let result = ScrollController::create(
            &clock,
            ContainerId::new(),
            ContainerMetrics::default(),
            options,
        );
        assert!(matches!(result, Err(Error::InvalidOption { name: "lerp", .. })));
    }
}
