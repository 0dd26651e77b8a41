use std::time::Duration;

use tokio::sync::watch;

use super::state::{AutoplayState, Direction, Interaction};
use crate::config::{AutoplayConfig, ReducedMotion};
use crate::lock::{ScrollLock, ScrollLockGuard};
use crate::{Error, Result};

/// Distance from a boundary that already counts as being at it
pub const BOUNDARY_TOLERANCE: f64 = 1.0;

const LOCK_OWNER: &str = "autoplay";

#[derive(Debug, Clone, PartialEq)]
pub struct AutoplayOptions {
    /// Units moved per frame while running
    pub speed: f64,
    pub idle_timeout: Duration,
    /// Units moved per frame while the pointer hovers an edge zone
    pub edge_speed: f64,
    /// Height of the top and bottom hover zones, as a viewport fraction
    pub edge_zone: f64,
    pub reduced_motion: ReducedMotion,
    pub lock_page_scroll: bool,
}

impl Default for AutoplayOptions {
    fn default() -> Self {
        Self::from_config(&AutoplayConfig::default())
    }
}

impl AutoplayOptions {
    pub fn from_config(config: &AutoplayConfig) -> Self {
        Self {
            speed: config.speed,
            idle_timeout: Duration::from_millis(config.idle_timeout_ms),
            edge_speed: config.edge_speed,
            edge_zone: config.edge_zone,
            reduced_motion: config.reduced_motion,
            lock_page_scroll: config.lock_page_scroll,
        }
    }

    pub fn validated(self) -> Result<Self> {
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(Error::invalid_option("speed", format!("{} is negative", self.speed)));
        }
        if !(self.edge_speed.is_finite() && self.edge_speed >= 0.0) {
            return Err(Error::invalid_option(
                "edge_speed",
                format!("{} is negative", self.edge_speed),
            ));
        }
        if !(self.edge_zone >= 0.0 && self.edge_zone <= 0.5) {
            return Err(Error::invalid_option(
                "edge_zone",
                format!("{} is not in [0, 0.5]", self.edge_zone),
            ));
        }
        Ok(self)
    }
}

/// Ping-pong autoplay with idle resume
///
/// Frames and interactions come from the owning controller, which applies
/// the returned positions to its smoother. Timestamps share the frame
/// clock's origin.
pub struct Autoplay {
    options: AutoplayOptions,
    state: AutoplayState,
    direction: Direction,
    idle_deadline: Option<Duration>,
    /// Idle timer requested outside a frame; armed at the next `poll`
    rearm: bool,
    host_prefers_reduced: bool,
    in_view: bool,
    edge: Option<Direction>,
    status: watch::Sender<String>,
    lock: Option<ScrollLock>,
    guard: Option<ScrollLockGuard>,
}

impl Autoplay {
    pub fn new(options: AutoplayOptions, host_prefers_reduced: bool) -> Self {
        let state = if options.reduced_motion.resolve(host_prefers_reduced) {
            AutoplayState::SuspendedByMotionPreference
        } else {
            AutoplayState::Running
        };
        let (status, _) = watch::channel(state.status_text().to_string());
        tracing::debug!(%state, speed = options.speed, "Autoplay created");
        Self {
            options,
            state,
            direction: Direction::Down,
            idle_deadline: None,
            rearm: false,
            host_prefers_reduced,
            in_view: true,
            edge: None,
            status,
            lock: None,
            guard: None,
        }
    }

    /// Hold `lock` while motion is live so the surrounding page stays put
    pub fn with_page_lock(mut self, lock: ScrollLock) -> Self {
        if self.options.lock_page_scroll {
            self.lock = Some(lock);
            self.sync_lock();
        }
        self
    }

    pub fn state(&self) -> AutoplayState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn options(&self) -> &AutoplayOptions {
        &self.options
    }

    pub fn idle_deadline(&self) -> Option<Duration> {
        self.idle_deadline
    }

    /// Whether an idle timer is running or about to be armed
    pub fn is_waiting(&self) -> bool {
        self.idle_deadline.is_some() || self.rearm
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    /// Effective reduced-motion setting after the configured override
    pub fn reduced_motion(&self) -> bool {
        self.options.reduced_motion.resolve(self.host_prefers_reduced)
    }

    /// Current live-region text
    pub fn status_text(&self) -> String {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change
    pub fn subscribe_status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Whether the sequencer could move the container on the next frame
    pub fn is_moving(&self) -> bool {
        self.edge.is_some() || (self.state == AutoplayState::Running && self.in_view)
    }

    pub fn interact(&mut self, interaction: Interaction, now: Duration) {
        if let Interaction::PointerMove { fraction } = interaction {
            self.edge = self.edge_for(fraction);
        } else if interaction.is_release() {
            self.edge = None;
        }

        match self.state {
            AutoplayState::SuspendedByMotionPreference => return,
            AutoplayState::Running if interaction.is_release() => return,
            AutoplayState::Running => {
                self.transition(AutoplayState::SuspendedByUser);
            }
            AutoplayState::SuspendedByUser => {}
        }
        self.rearm = false;
        self.idle_deadline = Some(now + self.options.idle_timeout);
        tracing::trace!(?interaction, deadline = ?self.idle_deadline, "Autoplay idle deadline armed");
    }

    /// Suspend like a pointer entering the container
    ///
    /// Motion stops now; the idle timer starts on the next frame and is
    /// refreshed by every later call.
    pub fn pause(&mut self) {
        match self.state {
            AutoplayState::SuspendedByMotionPreference => return,
            AutoplayState::Running => self.transition(AutoplayState::SuspendedByUser),
            AutoplayState::SuspendedByUser => {}
        }
        self.idle_deadline = None;
        self.rearm = true;
    }

    /// Counterpart of [`pause`](Self::pause), like a pointer leaving
    ///
    /// Restarts the idle timer instead of resuming on the spot.
    pub fn resume(&mut self) {
        if self.state == AutoplayState::SuspendedByUser {
            self.idle_deadline = None;
            self.rearm = true;
        }
    }

    /// Suspend with no idle timer; only [`resume_now`](Self::resume_now) or
    /// a later interaction brings motion back
    pub fn hold(&mut self) {
        if self.state == AutoplayState::Running {
            self.transition(AutoplayState::SuspendedByUser);
        }
        if self.state == AutoplayState::SuspendedByUser {
            self.idle_deadline = None;
            self.rearm = false;
        }
    }

    /// Resume immediately unless reduced motion is in effect
    pub fn resume_now(&mut self, position: f64, max: f64) {
        if self.state == AutoplayState::SuspendedByUser {
            self.idle_deadline = None;
            self.rearm = false;
            self.direction = Direction::away_from_nearer_boundary(position, max);
            self.transition(AutoplayState::Running);
        }
    }

    /// Apply a change in the host's reduced-motion preference
    pub fn set_motion_preference(&mut self, host_prefers_reduced: bool, position: f64, max: f64) {
        self.host_prefers_reduced = host_prefers_reduced;
        let reduced = self.options.reduced_motion.resolve(host_prefers_reduced);
        match (reduced, self.state) {
            (true, AutoplayState::SuspendedByMotionPreference) => {}
            (true, _) => {
                self.idle_deadline = None;
                self.rearm = false;
                self.transition(AutoplayState::SuspendedByMotionPreference);
            }
            (false, AutoplayState::SuspendedByMotionPreference) => {
                self.direction = Direction::away_from_nearer_boundary(position, max);
                self.transition(AutoplayState::Running);
            }
            (false, _) => {}
        }
    }

    /// Gate motion on whether the container is on screen
    pub fn set_in_view(&mut self, in_view: bool) {
        if self.in_view != in_view {
            tracing::debug!(in_view, "Autoplay viewport gate changed");
            self.in_view = in_view;
            self.sync_lock();
        }
    }

    /// Resume if the idle deadline has passed
    pub fn poll(&mut self, now: Duration, position: f64, max: f64) {
        if self.state != AutoplayState::SuspendedByUser {
            return;
        }
        if std::mem::take(&mut self.rearm) {
            self.idle_deadline = Some(now + self.options.idle_timeout);
            tracing::trace!(deadline = ?self.idle_deadline, "Autoplay idle deadline armed");
            return;
        }
        if let Some(deadline) = self.idle_deadline {
            if now >= deadline {
                self.idle_deadline = None;
                self.direction = Direction::away_from_nearer_boundary(position, max);
                tracing::debug!(position, direction = ?self.direction, "Autoplay resuming after idle");
                self.transition(AutoplayState::Running);
            }
        }
    }

    /// Position for this frame, or `None` when the sequencer leaves the
    /// container alone
    pub fn step(&mut self, now: Duration, position: f64, max: f64) -> Option<f64> {
        self.poll(now, position, max);
        if max <= 0.0 {
            return None;
        }

        // Edge hover is the user scrolling by hand, so it runs in every state,
        // reduced motion included
        if let Some(edge) = self.edge {
            let next = (position + edge.sign() * self.options.edge_speed).clamp(0.0, max);
            return (next != position).then_some(next);
        }

        if self.state != AutoplayState::Running || !self.in_view || self.options.speed == 0.0 {
            return None;
        }

        if position >= max - BOUNDARY_TOLERANCE {
            self.direction = Direction::Up;
        } else if position <= BOUNDARY_TOLERANCE {
            self.direction = Direction::Down;
        }
        Some((position + self.direction.sign() * self.options.speed).clamp(0.0, max))
    }

    fn edge_for(&self, fraction: f64) -> Option<Direction> {
        if self.options.edge_zone <= 0.0 || !fraction.is_finite() {
            None
        } else if fraction < self.options.edge_zone {
            Some(Direction::Up)
        } else if fraction > 1.0 - self.options.edge_zone {
            Some(Direction::Down)
        } else {
            None
        }
    }

    fn transition(&mut self, next: AutoplayState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = %self.state, to = %next, "Autoplay state changed");
        self.state = next;
        let text = next.status_text();
        self.status.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                text.clone_into(current);
                true
            }
        });
        self.sync_lock();
    }

    fn sync_lock(&mut self) {
        let wants = self.state == AutoplayState::Running && self.in_view;
        match (&self.lock, wants, self.guard.is_some()) {
            (Some(lock), true, false) => self.guard = Some(lock.acquire(LOCK_OWNER)),
            (_, false, true) => self.guard = None,
            _ => {}
        }
    }
}

impl std::fmt::Debug for Autoplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoplay")
            .field("state", &self.state)
            .field("direction", &self.direction)
            .field("idle_deadline", &self.idle_deadline)
            .field("in_view", &self.in_view)
            .field("edge", &self.edge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn autoplay() -> Autoplay {
        Autoplay::new(
            AutoplayOptions {
                reduced_motion: ReducedMotion::Off,
                ..AutoplayOptions::default()
            },
            false,
        )
    }

    /// Run `frames` frames from `start`, feeding positions back in
    fn run(
        autoplay: &mut Autoplay,
        start: Duration,
        frames: u32,
        mut position: f64,
        max: f64,
    ) -> (Duration, f64) {
        let mut now = start;
        for _ in 0..frames {
            now += FRAME;
            if let Some(next) = autoplay.step(now, position, max) {
                position = next;
            }
        }
        (now, position)
    }

    #[test]
    fn test_ping_pong_within_bounds() {
        let mut autoplay = autoplay();
        let mut position = 0.0;
        let mut now = Duration::ZERO;
        let mut peak: f64 = 0.0;
        let mut turned = false;
        let mut trough = f64::MAX;

        for _ in 0..4100 {
            now += FRAME;
            let next = autoplay.step(now, position, 1000.0).unwrap();
            assert!((0.0..=1000.0).contains(&next));
            if !turned && next < position {
                turned = true;
            }
            if turned {
                trough = trough.min(next);
            } else {
                peak = peak.max(next);
            }
            position = next;
        }

        assert!(peak >= 1000.0 - BOUNDARY_TOLERANCE);
        assert!(trough <= BOUNDARY_TOLERANCE);
    }

    #[test]
    fn test_pointer_enter_freezes_until_idle() {
        let mut autoplay = autoplay();
        let (now, position) = run(&mut autoplay, Duration::ZERO, 200, 0.0, 1000.0);
        assert!((position - 100.0).abs() < 1e-9);

        autoplay.interact(Interaction::PointerEnter, now);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);

        let mut t = now;
        while t < now + Duration::from_millis(2990) {
            t += Duration::from_millis(10);
            if t >= now + Duration::from_millis(3000) {
                break;
            }
            assert_eq!(autoplay.step(t, position, 1000.0), None);
        }

        let resumed = autoplay.step(now + Duration::from_millis(3000), position, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
        assert_eq!(resumed, Some(100.5));
    }

    #[test]
    fn test_newer_interaction_extends_deadline() {
        let mut autoplay = autoplay();
        let start = Duration::from_secs(1);
        autoplay.interact(Interaction::PointerEnter, start);
        autoplay.interact(Interaction::PointerMove { fraction: 0.5 }, start + Duration::from_millis(2000));

        autoplay.poll(start + Duration::from_millis(3500), 200.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);

        autoplay.poll(start + Duration::from_millis(5000), 200.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
    }

    #[test]
    fn test_pointer_leave_rearms_deadline() {
        let mut autoplay = autoplay();
        autoplay.interact(Interaction::PointerEnter, Duration::ZERO);
        autoplay.interact(Interaction::PointerLeave, Duration::from_millis(2500));
        assert_eq!(autoplay.idle_deadline(), Some(Duration::from_millis(5500)));

        autoplay.poll(Duration::from_millis(3000), 0.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);
    }

    #[test]
    fn test_resume_heads_away_from_nearer_boundary() {
        let mut autoplay = autoplay();
        autoplay.interact(Interaction::Wheel, Duration::ZERO);
        autoplay.poll(Duration::from_secs(4), 900.0, 1000.0);
        assert_eq!(autoplay.direction(), Direction::Up);

        autoplay.interact(Interaction::Wheel, Duration::from_secs(5));
        autoplay.poll(Duration::from_secs(9), 100.0, 1000.0);
        assert_eq!(autoplay.direction(), Direction::Down);
    }

    #[test]
    fn test_reduced_motion_never_moves() {
        let mut autoplay = Autoplay::new(AutoplayOptions::default(), true);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByMotionPreference);
        assert_eq!(
            autoplay.status_text(),
            "Auto-scrolling disabled due to reduced motion preference."
        );

        let mut now = Duration::ZERO;
        for _ in 0..500 {
            now += FRAME;
            autoplay.interact(Interaction::PointerLeave, now);
            assert_eq!(autoplay.step(now, 300.0, 1000.0), None);
        }
        assert_eq!(autoplay.idle_deadline(), None);
    }

    #[test]
    fn test_motion_preference_change_stops_same_frame() {
        let mut autoplay = Autoplay::new(AutoplayOptions::default(), false);
        let mut status = autoplay.subscribe_status();
        assert!(autoplay.step(FRAME, 0.0, 1000.0).is_some());

        autoplay.set_motion_preference(true, 0.5, 1000.0);
        assert_eq!(autoplay.step(FRAME * 2, 0.5, 1000.0), None);
        assert!(status.has_changed().unwrap());
        assert_eq!(
            *status.borrow_and_update(),
            AutoplayState::SuspendedByMotionPreference.status_text()
        );

        autoplay.set_motion_preference(false, 0.5, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
    }

    #[test]
    fn test_forced_reduced_motion_ignores_host() {
        let options = AutoplayOptions {
            reduced_motion: ReducedMotion::On,
            ..AutoplayOptions::default()
        };
        let mut autoplay = Autoplay::new(options, false);
        autoplay.set_motion_preference(false, 0.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByMotionPreference);
    }

    #[test]
    fn test_out_of_view_holds_position() {
        let mut autoplay = autoplay();
        autoplay.set_in_view(false);
        assert_eq!(autoplay.step(FRAME, 50.0, 1000.0), None);
        assert_eq!(autoplay.state(), AutoplayState::Running);

        autoplay.set_in_view(true);
        assert_eq!(autoplay.step(FRAME * 2, 50.0, 1000.0), Some(50.5));
    }

    #[test]
    fn test_edge_hover_scrolls_manually() {
        let mut autoplay = autoplay();
        autoplay.interact(Interaction::PointerEnter, Duration::ZERO);
        autoplay.interact(Interaction::PointerMove { fraction: 0.95 }, FRAME);
        assert_eq!(autoplay.step(FRAME, 100.0, 1000.0), Some(102.0));

        autoplay.interact(Interaction::PointerMove { fraction: 0.05 }, FRAME * 2);
        assert_eq!(autoplay.step(FRAME * 2, 100.0, 1000.0), Some(98.0));

        autoplay.interact(Interaction::PointerMove { fraction: 0.5 }, FRAME * 3);
        assert_eq!(autoplay.step(FRAME * 3, 100.0, 1000.0), None);

        autoplay.interact(Interaction::PointerMove { fraction: 0.05 }, FRAME * 4);
        assert_eq!(autoplay.step(FRAME * 4, 0.0, 1000.0), None);
    }

    #[test]
    fn test_pause_resumes_after_idle_timeout() {
        let mut autoplay = autoplay();
        let (now, position) = run(&mut autoplay, Duration::ZERO, 10, 0.0, 1000.0);
        autoplay.pause();
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);
        assert!(autoplay.is_waiting());

        // Timer starts on the first frame after the call
        let armed = now + FRAME;
        assert_eq!(autoplay.step(armed, position, 1000.0), None);
        assert_eq!(autoplay.idle_deadline(), Some(armed + Duration::from_secs(3)));

        autoplay.poll(armed + Duration::from_millis(2999), position, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);
        autoplay.poll(armed + Duration::from_secs(3), position, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
    }

    #[test]
    fn test_resume_restarts_idle_timer() {
        let mut autoplay = autoplay();
        autoplay.pause();
        autoplay.poll(Duration::ZERO, 0.0, 1000.0);
        autoplay.resume();
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);

        autoplay.poll(Duration::from_secs(2), 0.0, 1000.0);
        assert_eq!(autoplay.idle_deadline(), Some(Duration::from_secs(5)));
        autoplay.poll(Duration::from_millis(4999), 0.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);
        autoplay.poll(Duration::from_secs(5), 0.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
    }

    #[test]
    fn test_hold_waits_for_resume_now() {
        let mut autoplay = autoplay();
        autoplay.hold();
        assert!(!autoplay.is_waiting());
        autoplay.poll(Duration::from_secs(60), 500.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByUser);

        autoplay.resume_now(900.0, 1000.0);
        assert_eq!(autoplay.state(), AutoplayState::Running);
        assert_eq!(autoplay.direction(), Direction::Up);
    }

    #[test]
    fn test_pause_is_ignored_under_reduced_motion() {
        let mut autoplay = Autoplay::new(AutoplayOptions::default(), true);
        autoplay.pause();
        assert!(!autoplay.is_waiting());
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByMotionPreference);
    }

    #[test]
    fn test_edge_hover_under_reduced_motion_is_manual_scroll() {
        let mut autoplay = Autoplay::new(AutoplayOptions::default(), true);
        autoplay.interact(Interaction::PointerMove { fraction: 0.95 }, FRAME);
        assert_eq!(autoplay.step(FRAME, 100.0, 1000.0), Some(102.0));
        assert_eq!(autoplay.state(), AutoplayState::SuspendedByMotionPreference);

        // Leaving the edge zone stops it; nothing runs on its own
        autoplay.interact(Interaction::PointerMove { fraction: 0.5 }, FRAME * 2);
        assert_eq!(autoplay.step(FRAME * 2, 102.0, 1000.0), None);
    }

    #[test]
    fn test_zero_range_is_idle() {
        let mut autoplay = autoplay();
        assert_eq!(autoplay.step(FRAME, 0.0, 0.0), None);
    }

    #[test]
    fn test_page_lock_follows_motion() {
        let lock = ScrollLock::new();
        let options = AutoplayOptions {
            lock_page_scroll: true,
            reduced_motion: ReducedMotion::Off,
            ..AutoplayOptions::default()
        };
        let mut autoplay = Autoplay::new(options, false).with_page_lock(lock.clone());
        assert!(lock.is_locked());

        autoplay.interact(Interaction::Focus, Duration::ZERO);
        assert!(!lock.is_locked());

        autoplay.resume_now(10.0, 1000.0);
        assert!(lock.is_locked());

        drop(autoplay);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_options_validation() {
        assert!(AutoplayOptions::default().validated().is_ok());
        let bad = AutoplayOptions {
            speed: -1.0,
            ..AutoplayOptions::default()
        };
        assert!(bad.validated().is_err());
    }
}
