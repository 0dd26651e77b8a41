use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::info;

use choreo_core::{play_reveal_timeline, ChoreoConfig, FrameClock, RevealPhase};
use choreo_tui::{
    app::reveal_options,
    event::{AppEvent, EventHandler},
    theme::Theme,
    widgets::LoaderWidget,
};

use super::terminal::{self, Tui};

/// How long the finished loader stays on screen
const HOLD: Duration = Duration::from_millis(800);

pub async fn run(config: ChoreoConfig, prefers_reduced: bool) -> Result<()> {
    // Nothing animates under reduced motion: print the lines as they end up
    if config.autoplay.reduced_motion.resolve(prefers_reduced) {
        for line in &config.reveal.lines {
            println!("{line}");
        }
        return Ok(());
    }

    let mut terminal = terminal::setup("Choreo")?;
    let result = play(&mut terminal, &config);
    terminal::restore(&mut terminal)?;
    result
}

fn play(terminal: &mut Tui, config: &ChoreoConfig) -> Result<()> {
    let clock = FrameClock::global();
    let phases = RevealPhase::phases_from_config(&config.reveal);
    let mut playback = play_reveal_timeline(&clock, phases, reveal_options(&config.reveal)?);
    let mut completion = playback.completion();
    let event_handler = EventHandler::new(config.ui.tick_rate_ms, config.ui.fps);
    let theme = Theme::default();
    let mut finished_at: Option<Instant> = None;

    loop {
        clock.tick_now()?;
        let reveal = playback.frame();
        terminal.draw(|frame| {
            let area = frame.area();
            LoaderWidget::render(frame, area, &reveal, &config.reveal.lines, &theme)
        })?;

        if let Some(receiver) = completion.as_mut() {
            match receiver.try_recv() {
                Ok(()) => {
                    info!("Loader complete");
                    finished_at = Some(Instant::now());
                    completion = None;
                }
                Err(TryRecvError::Closed) => {
                    info!("Loader cancelled");
                    return Ok(());
                }
                Err(TryRecvError::Empty) => {}
            }
        }
        if finished_at.is_some_and(|at| at.elapsed() >= HOLD) {
            return Ok(());
        }

        if let Some(AppEvent::Key(key)) = event_handler.next(true)? {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('s') | KeyCode::Esc) {
                playback.cancel();
            }
        }
    }
}
