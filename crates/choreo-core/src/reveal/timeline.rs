use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use super::phase::{PhaseCallback, PhaseExit, RevealOptions, RevealPhase};
use crate::lock::ScrollLockGuard;
use crate::scroll::timing::{blink_on, is_complete, lerp, progress};
use crate::scroll::{EasingType, EasingTypeExt};

const LOCK_OWNER: &str = "reveal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Waiting for the first frame
    Pending,
    Revealing { phase: usize },
    /// Leaving a non-terminal phase
    Exiting { phase: usize },
    /// Gap before `next` starts
    Pausing { next: usize },
    /// Moving the cursor to its resting place after the last phase
    Settling,
    Complete,
    Cancelled,
}

impl RevealState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RevealState::Complete | RevealState::Cancelled)
    }
}

/// Cursor marker for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFrame {
    pub x: f64,
    pub width: f64,
    /// Blink state; the cursor is drawn only while `on`
    pub on: bool,
}

/// Render state of one phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseFrame {
    pub revealed: usize,
    pub opacity: f64,
    pub visible: bool,
    pub cursor: Option<CursorFrame>,
}

impl PhaseFrame {
    fn hidden() -> Self {
        Self {
            revealed: 0,
            opacity: 0.0,
            visible: false,
            cursor: None,
        }
    }
}

/// Snapshot of a timeline at its last advanced timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct RevealFrame {
    pub state: RevealState,
    pub phases: Vec<PhaseFrame>,
}

/// Callbacks released by an [`advance`](RevealTimeline::advance) call.
/// Run them once no borrow of the timeline is held.
#[must_use = "fired callbacks do nothing until run"]
#[derive(Default)]
pub struct Fired(Vec<PhaseCallback>);

impl Fired {
    pub fn run(self) {
        for callback in self.0 {
            callback();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sequential reveal of phases driven by frame timestamps
///
/// Each segment starts exactly where the previous one ended, so coarse or
/// irregular frames never shift later phases.
pub struct RevealTimeline {
    phases: Vec<RevealPhase>,
    options: RevealOptions,
    state: RevealState,
    segment_start: Duration,
    /// Start of each phase, filled as phases begin
    phase_starts: Vec<Option<Duration>>,
    now: Duration,
    on_complete: Option<PhaseCallback>,
    completion: Option<oneshot::Sender<()>>,
    guard: Option<ScrollLockGuard>,
}

impl RevealTimeline {
    pub fn new(phases: Vec<RevealPhase>, options: RevealOptions) -> Self {
        let phase_starts = vec![None; phases.len()];
        Self {
            phases,
            options,
            state: RevealState::Pending,
            segment_start: Duration::ZERO,
            phase_starts,
            now: Duration::ZERO,
            on_complete: None,
            completion: None,
            guard: None,
        }
    }

    /// Run `callback` exactly once when the last phase has finished
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Channel resolved on completion; dropped unresolved on cancellation
    pub fn completion_channel(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.completion = Some(tx);
        rx
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn phases(&self) -> &[RevealPhase] {
        &self.phases
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn holds_lock(&self) -> bool {
        self.guard.is_some()
    }

    /// Move the timeline to `now`, passing through every transition that
    /// has elapsed since the last call
    pub fn advance(&mut self, now: Duration) -> Fired {
        let mut fired = Fired::default();
        self.now = self.now.max(now);
        let now = self.now;

        loop {
            match self.state {
                RevealState::Pending => {
                    if let Some(lock) = &self.options.lock {
                        self.guard = Some(lock.acquire(LOCK_OWNER));
                    }
                    self.segment_start = now;
                    if self.phases.is_empty() {
                        self.finish(&mut fired);
                    } else {
                        self.begin_phase(0, now);
                    }
                }
                RevealState::Revealing { phase } => {
                    let span = self.phases[phase].reveal_duration;
                    if !is_complete(self.segment_start, now, span) {
                        break;
                    }
                    let end = self.segment_start + span;
                    debug!(phase, "Reveal phase complete");
                    if let Some(callback) = self.phases[phase].on_phase_complete.take() {
                        fired.0.push(callback);
                    }
                    self.segment_start = end;
                    if phase + 1 < self.phases.len() {
                        self.state = RevealState::Exiting { phase };
                    } else if self.options.settle.is_some() {
                        self.state = RevealState::Settling;
                    } else {
                        self.finish(&mut fired);
                    }
                }
                RevealState::Exiting { phase } => {
                    let span = self.options.exit.duration();
                    if !is_complete(self.segment_start, now, span) {
                        break;
                    }
                    self.segment_start += span;
                    self.state = RevealState::Pausing { next: phase + 1 };
                }
                RevealState::Pausing { next } => {
                    let span = self.options.inter_phase_pause;
                    if !is_complete(self.segment_start, now, span) {
                        break;
                    }
                    let start = self.segment_start + span;
                    self.begin_phase(next, start);
                }
                RevealState::Settling => {
                    let span = self.options.settle.map(|s| s.duration).unwrap_or_default();
                    if !is_complete(self.segment_start, now, span) {
                        break;
                    }
                    self.segment_start += span;
                    self.finish(&mut fired);
                }
                RevealState::Complete | RevealState::Cancelled => break,
            }
        }
        fired
    }

    /// Stop without completing; releases the lock and drops the
    /// completion channel unresolved
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        debug!(state = ?self.state, "Reveal timeline cancelled");
        self.state = RevealState::Cancelled;
        self.on_complete = None;
        self.completion = None;
        self.guard = None;
        for phase in &mut self.phases {
            phase.on_phase_complete = None;
        }
    }

    /// Render state at the last advanced timestamp
    pub fn frame(&self) -> RevealFrame {
        let phases = (0..self.phases.len())
            .map(|index| self.phase_frame(index))
            .collect();
        RevealFrame {
            state: self.state,
            phases,
        }
    }

    fn begin_phase(&mut self, phase: usize, start: Duration) {
        debug!(phase, units = self.phases[phase].len(), "Reveal phase started");
        self.segment_start = start;
        self.phase_starts[phase] = Some(start);
        self.state = RevealState::Revealing { phase };
    }

    fn finish(&mut self, fired: &mut Fired) {
        debug!("Reveal timeline complete");
        self.state = RevealState::Complete;
        if let Some(callback) = self.on_complete.take() {
            fired.0.push(callback);
        }
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(());
        }
        self.guard = None;
    }

    fn active_phase(&self) -> Option<usize> {
        match self.state {
            RevealState::Revealing { phase } | RevealState::Exiting { phase } => Some(phase),
            _ => None,
        }
    }

    fn phase_frame(&self, index: usize) -> PhaseFrame {
        let Some(start) = self.phase_starts[index] else {
            return PhaseFrame::hidden();
        };
        let phase = &self.phases[index];
        let elapsed = self.now.saturating_sub(start);
        let is_last = index + 1 == self.phases.len();
        let blink = blink_on(elapsed, self.options.blink_period);

        if self.active_phase() == Some(index) {
            if let RevealState::Exiting { .. } = self.state {
                return self.exiting_frame(phase);
            }
            return PhaseFrame {
                revealed: phase.revealed(elapsed),
                opacity: 1.0,
                visible: true,
                cursor: Some(CursorFrame {
                    x: phase.cursor_x(elapsed),
                    width: phase.cursor_width,
                    on: blink,
                }),
            };
        }

        if !is_last {
            // Finished non-terminal phase
            return match self.options.exit {
                PhaseExit::HideCursor => PhaseFrame {
                    revealed: phase.len(),
                    opacity: 1.0,
                    visible: true,
                    cursor: None,
                },
                PhaseExit::FadeOut { .. } => PhaseFrame::hidden(),
            };
        }

        // Terminal phase after its reveal span: the cursor rests or settles
        let rest_x = phase.len() as f64 * phase.cursor_width;
        let cursor = match (self.state, self.options.settle) {
            (RevealState::Settling, Some(settle)) => {
                let t = EasingType::EaseOut
                    .apply(progress(self.segment_start, self.now, settle.duration));
                CursorFrame {
                    x: lerp(rest_x, rest_x + settle.offset, t),
                    width: lerp(phase.cursor_width, settle.width, t),
                    on: true,
                }
            }
            (_, Some(settle)) => CursorFrame {
                x: rest_x + settle.offset,
                width: settle.width,
                on: blink,
            },
            (_, None) => CursorFrame {
                x: rest_x,
                width: phase.cursor_width,
                on: blink,
            },
        };
        PhaseFrame {
            revealed: phase.len(),
            opacity: 1.0,
            visible: true,
            cursor: (self.state != RevealState::Cancelled).then_some(cursor),
        }
    }

    fn exiting_frame(&self, phase: &RevealPhase) -> PhaseFrame {
        match self.options.exit {
            PhaseExit::FadeOut { .. } => {
                let t = progress(self.segment_start, self.now, self.options.exit.duration());
                PhaseFrame {
                    revealed: phase.len(),
                    opacity: 1.0 - t,
                    visible: t < 1.0,
                    cursor: None,
                }
            }
            PhaseExit::HideCursor => PhaseFrame {
                revealed: phase.len(),
                opacity: 1.0,
                visible: true,
                cursor: None,
            },
        }
    }
}

impl fmt::Debug for RevealTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealTimeline")
            .field("phases", &self.phases)
            .field("state", &self.state)
            .field("segment_start", &self.segment_start)
            .field("holds_lock", &self.guard.is_some())
            .finish()
    }
}
