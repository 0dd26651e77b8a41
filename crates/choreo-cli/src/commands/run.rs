use anyhow::Result;
use tracing::info;

use choreo_core::{ChoreoConfig, SiteContent};
use choreo_tui::{
    event::{AppEvent, EventHandler},
    ui::draw,
    App,
};

use super::terminal::{self, Tui};

pub async fn run(config: ChoreoConfig, content: SiteContent, prefers_reduced: bool) -> Result<()> {
    let mut terminal = terminal::setup("Choreo")?;
    let result = event_loop(&mut terminal, config, content, prefers_reduced);
    terminal::restore(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Tui,
    config: ChoreoConfig,
    content: SiteContent,
    prefers_reduced: bool,
) -> Result<()> {
    let size = terminal.size()?;
    let event_handler = EventHandler::new(config.ui.tick_rate_ms, config.ui.fps);
    let mut app = App::new(config, content, prefers_reduced, size.width, size.height)?;
    info!(width = size.width, height = size.height, "Page preview started");

    // Main loop
    loop {
        app.tick()?;
        terminal.draw(|frame| draw(frame, &mut app))?;

        if app.should_quit {
            break;
        }

        // Poll at the frame rate only while the clock has subscribers
        match event_handler.next(app.wants_frame())? {
            Some(AppEvent::Key(key)) => app.handle_key(key),
            Some(AppEvent::Mouse(mouse)) => app.handle_mouse(mouse),
            Some(AppEvent::Resize(width, height)) => app.resize(width, height),
            Some(AppEvent::FocusLost) => app.focus_lost(),
            Some(AppEvent::Tick) | None => {}
        }
    }

    info!("Page preview closed");
    Ok(())
}
