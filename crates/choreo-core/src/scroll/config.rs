//! L4 Atomic Layer: Configuration helpers for the scroll smoother
//!
//! Re-exports configuration from the crate config and provides additional utilities.

use std::time::Duration;

pub use crate::config::{EasingType, ScrollConfig};

/// Extension trait for ScrollConfig with utility methods
pub trait ScrollConfigExt {
    /// Get the default scroll_to duration as Duration
    fn scroll_to_duration(&self) -> Duration;

    /// Check if wheel smoothing is effectively enabled
    fn is_smooth(&self) -> bool;

    /// Lerp factor clamped into (0, 1]
    fn lerp_factor(&self) -> f64;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn scroll_to_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_to_duration_ms)
    }

    #[inline]
    fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.lerp < 1.0
    }

    #[inline]
    fn lerp_factor(&self) -> f64 {
        if self.lerp.is_finite() && self.lerp > 0.0 {
            self.lerp.min(1.0)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_to_duration() {
        let config = ScrollConfig {
            scroll_to_duration_ms: 200,
            ..Default::default()
        };
        assert_eq!(config.scroll_to_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_is_smooth() {
        let mut config = ScrollConfig::default();
        assert!(config.is_smooth());

        config.smooth_enabled = false;
        assert!(!config.is_smooth());

        // A lerp of 1 reaches the target in one frame: same as pass-through
        config.smooth_enabled = true;
        config.lerp = 1.0;
        assert!(!config.is_smooth());
    }

    #[test]
    fn test_lerp_factor_guards_bad_values() {
        let mut config = ScrollConfig::default();
        config.lerp = -3.0;
        assert_eq!(config.lerp_factor(), 1.0);
        config.lerp = f64::NAN;
        assert_eq!(config.lerp_factor(), 1.0);
        config.lerp = 4.0;
        assert_eq!(config.lerp_factor(), 1.0);
    }
}
