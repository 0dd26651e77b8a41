//! L4 Atomic Layer: Pure easing functions for scroll and reveal animations
//!
//! Provides mathematical easing functions that map input [0, 1] to output [0, 1]
//! with various acceleration curves.

use std::fmt;
use std::rc::Rc;

// Re-export EasingType from config
pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => if t < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => t,
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quintic => quintic_ease_out(t),
            EasingType::EaseOut => exponential_ease_out(t),
            EasingType::EaseOutExpo => expo_ease_out_overshoot(t),
        }
    }
}

/// A named curve or a caller-supplied one
#[derive(Clone)]
pub enum Easing {
    Named(EasingType),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    pub fn custom(curve: impl Fn(f64) -> f64 + 'static) -> Self {
        Easing::Custom(Rc::new(curve))
    }

    /// Evaluate at `t`; custom curves are clamped into [0, 1] on both sides
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Named(kind) => kind.apply(t),
            Easing::Custom(curve) => curve(t.clamp(0.0, 1.0)).clamp(0.0, 1.0),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Named(EasingType::default())
    }
}

impl From<EasingType> for Easing {
    fn from(kind: EasingType) -> Self {
        Easing::Named(kind)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Named(kind) => write!(f, "Easing::{kind:?}"),
            Easing::Custom(_) => f.write_str("Easing::Custom"),
        }
    }
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(t) = 1 - 2^(-10t)
#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

/// f(t) = min(1, 1.001 - 2^(-10t)); reaches 1 slightly before t = 1
///
/// Pinned to 0 at t = 0 so a fresh animation starts exactly where it was
/// latched.
#[inline]
fn expo_ease_out_overshoot(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    (1.001 - 2.0_f64.powf(-10.0 * t)).min(1.0)
}
