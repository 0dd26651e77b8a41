//! Autoplay sequencer
//!
//! Drives a container back and forth between its bounds, yields to the
//! user on interaction and comes back after an idle period. The sequencer
//! is pure state: the owning controller feeds it frames and interactions
//! and applies the positions it returns.

pub mod sequencer;
pub mod state;

pub use sequencer::{Autoplay, AutoplayOptions, BOUNDARY_TOLERANCE};
pub use state::{AutoplayState, Direction, Interaction};
