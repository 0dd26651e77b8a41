use std::fmt;
use std::time::Duration;

use crate::config::{PhaseExitKind, RevealConfig};
use crate::lock::ScrollLock;
use crate::{Error, Result};

pub(crate) type PhaseCallback = Box<dyn FnOnce()>;

/// One line (or paragraph) of staggered units
pub struct RevealPhase {
    pub units: Vec<String>,
    /// Span across which the units are evenly staggered
    pub reveal_duration: Duration,
    /// Horizontal advance of the cursor per revealed unit
    pub cursor_width: f64,
    pub(crate) on_phase_complete: Option<PhaseCallback>,
}

impl RevealPhase {
    pub fn new(units: Vec<String>, reveal_duration: Duration) -> Self {
        Self {
            units,
            reveal_duration,
            cursor_width: 1.0,
            on_phase_complete: None,
        }
    }

    /// Split `text` into one unit per character
    pub fn from_text(text: &str, reveal_duration: Duration) -> Self {
        Self::new(text.chars().map(String::from).collect(), reveal_duration)
    }

    pub fn with_cursor_width(mut self, width: f64) -> Self {
        self.cursor_width = width;
        self
    }

    /// Run `callback` once when this phase's last unit has been revealed
    /// and the reveal span has elapsed
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_phase_complete = Some(Box::new(callback));
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Offset of unit `index` from the phase start
    pub fn unit_offset(&self, index: usize) -> Duration {
        let n = self.units.len().max(1) as u32;
        let index = index.min(u32::MAX as usize) as u32;
        self.reveal_duration * index / n
    }

    /// Progress through the reveal span, 0.0 to 1.0
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.reveal_duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.reveal_duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }

    /// Number of units whose reveal time has passed
    pub fn revealed(&self, elapsed: Duration) -> usize {
        let n = self.units.len();
        if n == 0 || self.reveal_duration.is_zero() {
            return n;
        }
        let stepped = (elapsed.as_secs_f64() * n as f64 / self.reveal_duration.as_secs_f64())
            .floor() as usize;
        (stepped + 1).min(n)
    }

    /// Cursor position at `elapsed`, moving in whole unit steps
    pub fn cursor_x(&self, elapsed: Duration) -> f64 {
        let n = self.units.len() as f64;
        (self.progress(elapsed) * n).floor() * self.cursor_width
    }

    /// Build one phase per configured line
    pub fn phases_from_config(config: &RevealConfig) -> Vec<RevealPhase> {
        config
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                RevealPhase::from_text(
                    line,
                    Duration::from_millis(config.phase_duration_ms(index)),
                )
                .with_cursor_width(f64::from(config.unit_width))
            })
            .collect()
    }
}

impl fmt::Debug for RevealPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealPhase")
            .field("units", &self.units.len())
            .field("reveal_duration", &self.reveal_duration)
            .field("cursor_width", &self.cursor_width)
            .field("on_phase_complete", &self.on_phase_complete.is_some())
            .finish()
    }
}

/// How a non-terminal phase leaves before the next one starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseExit {
    /// Fade the phase's text to transparent
    FadeOut { ms: u64 },
    /// Leave the text in place and hide the cursor
    HideCursor,
}

impl PhaseExit {
    pub fn duration(self) -> Duration {
        match self {
            PhaseExit::FadeOut { ms } => Duration::from_millis(ms),
            PhaseExit::HideCursor => Duration::ZERO,
        }
    }
}

impl Default for PhaseExit {
    fn default() -> Self {
        PhaseExit::FadeOut { ms: 200 }
    }
}

/// Final cursor nudge after the last phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSettle {
    pub offset: f64,
    pub width: f64,
    pub duration: Duration,
}

impl Default for CursorSettle {
    fn default() -> Self {
        Self {
            offset: 4.0,
            width: 8.0,
            duration: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevealOptions {
    pub inter_phase_pause: Duration,
    pub exit: PhaseExit,
    pub blink_period: Duration,
    pub settle: Option<CursorSettle>,
    /// Held from the first frame until completion or cancellation
    pub lock: Option<ScrollLock>,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            inter_phase_pause: Duration::from_millis(200),
            exit: PhaseExit::default(),
            blink_period: Duration::from_millis(1000),
            settle: None,
            lock: None,
        }
    }
}

impl RevealOptions {
    pub fn from_config(config: &RevealConfig) -> Self {
        let exit = match config.phase_exit {
            PhaseExitKind::FadeOut => PhaseExit::FadeOut {
                ms: config.fade_out_ms,
            },
            PhaseExitKind::HideCursor => PhaseExit::HideCursor,
        };
        Self {
            inter_phase_pause: Duration::from_millis(config.inter_phase_pause_ms),
            exit,
            blink_period: Duration::from_millis(config.blink_period_ms),
            settle: config.settle_cursor.then(CursorSettle::default),
            lock: None,
        }
    }

    pub fn with_lock(mut self, lock: ScrollLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn validated(self) -> Result<Self> {
        if self.blink_period.is_zero() {
            return Err(Error::invalid_option("blink_period", "must be non-zero".to_string()));
        }
        Ok(self)
    }
}
