//! Reveal timeline sequencer
//!
//! Plays phases of staggered units (loader lines, paragraphs) one after
//! another with a stepping, blinking cursor. [`RevealTimeline`] is the pure
//! state machine; [`play_reveal_timeline`] drives one from a frame clock.

pub mod phase;
pub mod playback;
pub mod timeline;

pub use phase::{CursorSettle, PhaseExit, RevealOptions, RevealPhase};
pub use playback::{play_reveal_timeline, RevealCanceller, RevealPlayback};
pub use timeline::{CursorFrame, Fired, PhaseFrame, RevealFrame, RevealState, RevealTimeline};
