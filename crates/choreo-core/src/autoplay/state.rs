use std::fmt;

/// Autoplay lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Running,
    /// Frozen until the idle deadline passes without interaction
    SuspendedByUser,
    /// Frozen while the reduced-motion preference is active
    SuspendedByMotionPreference,
}

impl AutoplayState {
    /// Text announced to assistive technology for this state
    pub fn status_text(self) -> &'static str {
        match self {
            AutoplayState::Running => "Article auto-scrolling. Hover to control manually.",
            AutoplayState::SuspendedByUser => "Article scrolling paused. Move mouse away to resume.",
            AutoplayState::SuspendedByMotionPreference => {
                "Auto-scrolling disabled due to reduced motion preference."
            }
        }
    }
}

impl fmt::Display for AutoplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AutoplayState::Running => "auto",
            AutoplayState::SuspendedByUser => "manual",
            AutoplayState::SuspendedByMotionPreference => "reduced-motion",
        };
        f.write_str(label)
    }
}

/// Scroll direction along the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the content
    Down,
    /// Toward the start of the content
    Up,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Down => 1.0,
            Direction::Up => -1.0,
        }
    }

    /// Head away from whichever boundary `position` is closer to
    pub fn away_from_nearer_boundary(position: f64, max: f64) -> Self {
        if position < max / 2.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// User input the view layer forwards to the sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    PointerEnter,
    PointerLeave,
    /// Pointer moved; `fraction` is its height within the viewport, 0 = top
    PointerMove { fraction: f64 },
    Focus,
    Blur,
    TouchMove,
    Wheel,
}

impl Interaction {
    /// Interactions that end a hover/focus session and re-arm the idle timer
    #[inline]
    pub fn is_release(self) -> bool {
        matches!(self, Interaction::PointerLeave | Interaction::Blur)
    }
}
