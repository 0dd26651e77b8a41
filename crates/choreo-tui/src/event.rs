use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};

/// Event handler for terminal events
///
/// Polls at the frame interval while something animates and at the slower
/// tick rate otherwise.
pub struct EventHandler {
    tick_rate: Duration,
    frame_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64, fps: u32) -> Self {
        let fps = fps.clamp(1, 240);
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms.max(1)),
            frame_interval: Duration::from_secs(1) / fps,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Poll for the next event; `animating` selects the frame interval
    pub fn next(&self, animating: bool) -> Result<Option<AppEvent>> {
        let timeout = if animating {
            self.frame_interval
        } else {
            self.tick_rate
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events, ignore release events
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Mouse(mouse) => Ok(Some(AppEvent::Mouse(mouse))),
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                Event::FocusLost => Ok(Some(AppEvent::FocusLost)),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// The terminal window lost focus
    FocusLost,
    /// Nothing happened within the poll interval
    Tick,
}
