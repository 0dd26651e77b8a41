pub mod autoplay;
pub mod clock;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod lock;
pub mod reveal;
pub mod scroll;
pub mod trigger;
pub mod visibility;

pub use autoplay::{Autoplay, AutoplayOptions, AutoplayState};
pub use clock::{FrameClock, FrameControl, Subscription};
pub use config::{ChoreoConfig, EasingType, ReducedMotion, ScrollConfig};
pub use content::SiteContent;
pub use controller::{
    AutoplayHandle, ContainerEvent, ContainerMetrics, ControllerOptions, ControllerSnapshot,
    ScrollController,
};
pub use error::{Error, Result};
pub use geometry::{Extent, Rect, RootMargin};
pub use ids::{ContainerId, ElementId};
pub use lock::{ScrollLock, ScrollLockGuard};
pub use reveal::{play_reveal_timeline, RevealOptions, RevealPhase, RevealPlayback};
pub use trigger::{TriggerHandle, TriggerOptions, TriggerRegistry};
pub use visibility::{VisibilityEntry, VisibilityField, VisibilityPolicy};
