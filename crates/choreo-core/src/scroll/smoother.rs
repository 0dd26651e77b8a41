//! L3 Molecular Layer: Virtual scroll smoother
//!
//! Combines easing functions and timing utilities into the virtual scroll
//! position of one container. Call `scroll_to()`/`scroll_by()` from input
//! handlers, then `tick()` once per frame to get the interpolated position.

use std::time::Duration;

use tracing::trace;

use super::config::{ScrollConfig, ScrollConfigExt};
use super::easing::Easing;
use super::timing::{is_complete, lerp, progress};
use crate::ids::ContainerId;

/// Distance under which smoothing snaps onto its target
pub const SETTLE_EPSILON: f64 = 1e-3;

/// Virtual scroll state of one container
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTarget {
    pub container_id: ContainerId,
    /// Where the content visually is
    pub current: f64,
    /// Where input asked it to be
    pub target: f64,
    /// Largest valid position; 0 when nothing scrolls
    pub max: f64,
}

impl ScrollTarget {
    #[inline]
    fn clamp(&self, position: f64) -> f64 {
        if position.is_nan() {
            return self.current;
        }
        position.clamp(0.0, self.max)
    }
}

/// Active scroll_to animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    /// Latched on the first frame after the request
    start: Option<Duration>,
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
}

/// Scroll smoother
///
/// Owns the [`ScrollTarget`] of its container. Programmatic `scroll_to`
/// animations take precedence; otherwise wheel input is either applied
/// directly or eased in with a per-frame lerp.
#[derive(Debug, Clone)]
pub struct ScrollSmoother {
    state: ScrollTarget,
    animation: Option<ActiveAnimation>,
    config: ScrollConfig,
    /// Wheel deltas batched until the next frame
    pending_delta: f64,
}

impl ScrollSmoother {
    /// Create a smoother with an empty scroll range; call `set_bounds` once measured
    pub fn new(container_id: ContainerId, config: ScrollConfig) -> Self {
        Self {
            state: ScrollTarget {
                container_id,
                current: 0.0,
                target: 0.0,
                max: 0.0,
            },
            animation: None,
            config,
            pending_delta: 0.0,
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Update configuration
    pub fn set_config(&mut self, config: ScrollConfig) {
        self.config = config;
    }

    /// Recompute the scroll range after a content or viewport resize
    pub fn set_bounds(&mut self, content_height: f64, viewport_height: f64) {
        let max = (content_height - viewport_height).max(0.0);
        self.state.max = if max.is_finite() { max } else { 0.0 };
        self.state.current = self.state.clamp(self.state.current);
        self.state.target = self.state.clamp(self.state.target);
        if let Some(animation) = self.animation.as_mut() {
            animation.to = animation.to.clamp(0.0, self.state.max);
        }
    }

    /// Check if a scroll_to animation is in flight
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Check if there's pending work; use this to decide whether frames are needed
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.animation.is_some()
            || self.pending_delta != 0.0
            || (self.state.target - self.state.current).abs() > SETTLE_EPSILON
    }

    /// Get the current interpolated scroll position
    #[inline]
    pub fn position(&self) -> f64 {
        self.state.current
    }

    /// Get the target scroll position (final position after animation)
    pub fn target(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.state.target)
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.state.max
    }

    /// True when the container has no scrollable range
    #[inline]
    pub fn is_static(&self) -> bool {
        self.state.max <= 0.0
    }

    pub fn snapshot(&self) -> ScrollTarget {
        self.state.clone()
    }

    /// Animate to `position` over `duration`
    ///
    /// Supersedes any animation in flight, starting from the current
    /// interpolated position rather than the old target.
    pub fn scroll_to(&mut self, position: f64, duration: Duration, easing: impl Into<Easing>) {
        if self.is_static() {
            return;
        }
        let to = self.state.clamp(position);
        self.pending_delta = 0.0;
        self.state.target = to;

        if duration.is_zero() {
            self.state.current = to;
            self.animation = None;
            return;
        }

        let from = self.state.current;
        if (from - to).abs() <= SETTLE_EPSILON {
            self.state.current = to;
            self.animation = None;
            return;
        }

        trace!(container = %self.state.container_id, from, to, "scroll_to");
        self.animation = Some(ActiveAnimation {
            start: None,
            from,
            to,
            duration,
            easing: easing.into(),
        });
    }

    /// Animate to `position` with the configured duration and easing
    pub fn scroll_to_default(&mut self, position: f64) {
        let duration = self.config.scroll_to_duration();
        let easing = self.config.easing;
        self.scroll_to(position, duration, easing);
    }

    /// Scroll by a wheel delta (positive = down, negative = up)
    ///
    /// Multiple deltas within the same frame are batched when smoothing is on.
    pub fn scroll_by(&mut self, delta: f64) {
        if self.is_static() || !delta.is_finite() {
            return;
        }
        let delta = delta * self.config.wheel_multiplier;

        if !self.config.is_smooth() {
            self.animation = None;
            self.state.current = self.state.clamp(self.state.current + delta);
            self.state.target = self.state.current;
            return;
        }

        self.pending_delta += delta;
    }

    /// Adopt a position reported by native scrolling (pass-through)
    pub fn set_native(&mut self, position: f64) {
        self.animation = None;
        self.pending_delta = 0.0;
        self.state.current = self.state.clamp(position);
        self.state.target = self.state.current;
    }

    /// Move immediately, leaving no animation behind (used by autoplay)
    pub fn jump_to(&mut self, position: f64) {
        self.set_native(position);
    }

    /// Advance one frame and return the current position
    pub fn tick(&mut self, now: Duration) -> f64 {
        if self.pending_delta != 0.0 {
            // Wheel input wins over a programmatic animation
            let base = if self.animation.take().is_some() {
                self.state.current
            } else {
                self.state.target
            };
            self.state.target = self.state.clamp(base + self.pending_delta);
            self.pending_delta = 0.0;
        }

        if let Some(animation) = self.animation.as_mut() {
            let start = *animation.start.get_or_insert(now);
            if is_complete(start, now, animation.duration) {
                self.state.current = animation.to;
                self.state.target = animation.to;
                self.animation = None;
            } else if now <= start {
                // First sample of a new animation stays where it was latched
                self.state.current = animation.from;
            } else {
                let t = animation.easing.apply(progress(start, now, animation.duration));
                self.state.current = lerp(animation.from, animation.to, t);
            }
        } else if self.state.current != self.state.target {
            let factor = if self.config.is_smooth() {
                self.config.lerp_factor()
            } else {
                1.0
            };
            self.state.current += (self.state.target - self.state.current) * factor;
            if (self.state.target - self.state.current).abs() <= SETTLE_EPSILON {
                self.state.current = self.state.target;
            }
        }

        self.state.current = self.state.clamp(self.state.current);
        self.state.current
    }

    /// Cancel any active animation and stop at current position
    pub fn cancel(&mut self) {
        self.animation = None;
        self.pending_delta = 0.0;
        self.state.target = self.state.current;
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.animation = None;
        self.pending_delta = 0.0;
        self.state.current = 0.0;
        self.state.target = 0.0;
    }
}
