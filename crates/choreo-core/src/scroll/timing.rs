//! L4 Atomic Layer: Time calculation utilities for frame-driven animations
//!
//! Frame timestamps are `Duration`s since the frame clock's origin, so every
//! function here is pure and deterministic.

use std::time::Duration;

/// Calculate animation progress (0.0 to 1.0) from start time and duration
///
/// # Arguments
/// * `start` - Frame timestamp the animation started at
/// * `now` - Current frame timestamp
/// * `duration` - Total animation duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(start: Duration, now: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if animation is complete
#[inline]
pub fn is_complete(start: Duration, now: Duration, duration: Duration) -> bool {
    now.saturating_sub(start) >= duration
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
///
/// # Returns
/// Interpolated value
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Square wave with the given period, `true` during the first half
#[inline]
pub fn blink_on(elapsed: Duration, period: Duration) -> bool {
    if period.is_zero() {
        return true;
    }
    let phase = elapsed.as_nanos() % period.as_nanos();
    phase < period.as_nanos() / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_progress() {
        assert!((progress(ms(100), ms(150), ms(100)) - 0.5).abs() < 0.001);
        assert_eq!(progress(ms(100), ms(50), ms(100)), 0.0);
        assert_eq!(progress(ms(100), ms(500), ms(100)), 1.0);
        assert!(is_complete(ms(100), ms(200), ms(100)));
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(ms(5), ms(5), Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_blink() {
        let period = ms(1000);
        assert!(blink_on(ms(0), period));
        assert!(blink_on(ms(499), period));
        assert!(!blink_on(ms(500), period));
        assert!(blink_on(ms(1000), period));
    }
}
