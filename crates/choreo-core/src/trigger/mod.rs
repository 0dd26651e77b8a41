//! Viewport trigger registry
//!
//! Watches element rectangles against a root rectangle (the container's
//! viewport in content space) and raises enter/leave events when the
//! intersection ratio crosses each element's threshold.
//!
//! - `options` - Threshold and root margin validation
//! - `registry` - Registration, batched observation and handles
//! - `behaviors` - Anchoring and in-view flags built on top

pub mod behaviors;
pub mod options;
pub mod registry;

pub use behaviors::{anchor_position, InViewFlag};
pub use options::TriggerOptions;
pub use registry::{TriggerEvent, TriggerHandle, TriggerKind, TriggerRegistry};
