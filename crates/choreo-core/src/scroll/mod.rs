//! Virtual scroll system
//!
//! Converts discrete wheel/native scroll input and programmatic `scroll_to`
//! requests into a continuously interpolated position per container.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (cubic, quintic, exponential, custom)
//! - `timing` - Frame-time utilities (progress, interpolation, blink)
//! - `config` - Configuration helpers (re-exported from the crate config)
//!
//! ## L3 Molecular Layer
//! - `smoother` - Scroll smoother combining atoms
//!
//! # Usage
//!
//! ```ignore
//! use choreo_core::scroll::{ScrollSmoother, ScrollConfig};
//!
//! let mut smoother = ScrollSmoother::new(ContainerId::new(), ScrollConfig::default());
//! smoother.set_bounds(content_height, viewport_height);
//!
//! // From input handlers
//! smoother.scroll_by(wheel_delta);
//!
//! // Once per frame
//! let position = smoother.tick(frame_time);
//! ```

// L4 Atomic Layer
pub mod config;
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod smoother;

// Re-exports for convenient access
pub use config::{ScrollConfig, ScrollConfigExt};
pub use easing::{Easing, EasingType, EasingTypeExt};
pub use smoother::{ScrollSmoother, ScrollTarget, SETTLE_EPSILON};
