use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect as Area;
use tokio::sync::watch;
use tracing::{debug, info};

use choreo_core::config::RevealConfig;
use choreo_core::content::SiteContent;
use choreo_core::reveal::{CursorSettle, RevealFrame};
use choreo_core::trigger::{anchor_position, InViewFlag};
use choreo_core::{
    play_reveal_timeline, AutoplayHandle, AutoplayOptions, AutoplayState, ChoreoConfig,
    ContainerEvent, ContainerId, ContainerMetrics, ControllerOptions, FrameClock, RevealOptions,
    RevealPhase, RevealPlayback, ScrollController, ScrollLock, TriggerHandle, TriggerOptions,
    VisibilityEntry,
};

use crate::layout::PageLayout;
use crate::theme::Theme;

/// Nominal pixel height of a terminal row; autoplay speeds are configured in pixels
pub const ROW_PX: f64 = 16.0;

/// Rows moved per wheel notch or arrow key
const WHEEL_ROWS: f64 = 3.0;

/// The article counts as on screen once any of it shows
const ARTICLE_THRESHOLD: f64 = 0.01;

/// Section the page snaps to when it scrolls in
const ANCHORED_SECTION: usize = 2;

/// Loader options with the cursor nudge sized for terminal cells
pub fn reveal_options(config: &RevealConfig) -> choreo_core::Result<RevealOptions> {
    let mut options = RevealOptions::from_config(config).validated()?;
    options.settle = options.settle.map(|settle| CursorSettle {
        offset: 1.0,
        width: 2.0,
        ..settle
    });
    Ok(options)
}

struct Tracked {
    _handle: TriggerHandle,
    flag: InViewFlag,
}

/// Application state
pub struct App {
    pub config: ChoreoConfig,
    pub content: SiteContent,
    pub theme: Theme,
    clock: FrameClock,
    page_lock: ScrollLock,
    /// Root page scroll, locked while the loader plays
    page: ScrollController,
    /// The auto-scrolling about article
    article: ScrollController,
    autoplay: Option<AutoplayHandle>,
    loader: Option<RevealPlayback>,
    layout: PageLayout,
    sections: Vec<Tracked>,
    article_tracker: Option<Tracked>,
    _anchor: Option<TriggerHandle>,
    article_in_view: bool,
    status: watch::Receiver<String>,
    prefers_reduced: bool,
    article_focused: bool,
    pointer_in_article: bool,
    /// Screen area of the article body, set by the last draw
    article_area: Option<Area>,
    pub should_quit: bool,
}

impl App {
    /// Build the app on the thread's shared frame clock
    pub fn new(
        config: ChoreoConfig,
        content: SiteContent,
        prefers_reduced: bool,
        width: u16,
        height: u16,
    ) -> Result<Self> {
        Self::with_clock(FrameClock::global(), config, content, prefers_reduced, width, height)
    }

    pub fn with_clock(
        clock: FrameClock,
        config: ChoreoConfig,
        content: SiteContent,
        prefers_reduced: bool,
        width: u16,
        height: u16,
    ) -> Result<Self> {
        let page_lock = ScrollLock::new();
        let viewport = height.saturating_sub(1);
        let layout = PageLayout::build(&content, width, viewport);

        let base = ControllerOptions {
            host_prefers_reduced: prefers_reduced,
            ..ControllerOptions::from_config(&config)?
        };

        let page = ScrollController::create(
            &clock,
            ContainerId::new(),
            ContainerMetrics::new(layout.content_height(), f64::from(viewport), f64::from(width)),
            base.clone().with_input_lock(page_lock.clone()),
        )?;

        let article = ScrollController::create(
            &clock,
            ContainerId::new(),
            ContainerMetrics::new(
                layout.article_content_height(),
                layout.article_viewport_height(),
                f64::from(layout.text_width),
            ),
            base.with_page_lock(page_lock.clone()),
        )?;
        article.set_units(layout.paragraphs.clone());

        let autoplay = if config.autoplay.enabled {
            let options = AutoplayOptions::from_config(&config.autoplay);
            Some(article.start_autoplay(AutoplayOptions {
                speed: options.speed / ROW_PX,
                edge_speed: options.edge_speed / ROW_PX,
                ..options
            })?)
        } else {
            None
        };
        let status = article.status();

        let mut app = Self {
            config,
            content,
            theme: Theme::default(),
            clock,
            page_lock,
            page,
            article,
            autoplay,
            loader: None,
            layout,
            sections: Vec::new(),
            article_tracker: None,
            _anchor: None,
            article_in_view: true,
            status,
            prefers_reduced,
            article_focused: false,
            pointer_in_article: false,
            article_area: None,
            should_quit: false,
        };
        app.register_triggers()?;
        app.start_loader()?;
        Ok(app)
    }

    fn register_triggers(&mut self) -> Result<()> {
        let options = TriggerOptions::from_config(&self.config.trigger)?;
        for index in 0..self.layout.sections.len() {
            let Some(rect) = self.layout.section_rect(index) else {
                continue;
            };
            let (handle, flag) =
                self.page
                    .track_in_view(PageLayout::section_element(index), rect, options);
            self.sections.push(Tracked {
                _handle: handle,
                flag,
            });
        }

        let (handle, flag) = self.page.track_in_view(
            self.layout.article_element(),
            self.layout.article_rect(),
            TriggerOptions::new(ARTICLE_THRESHOLD, "0px")?,
        );
        self.article_tracker = Some(Tracked {
            _handle: handle,
            flag,
        });

        // Skipped when the section already shows on the first screen
        let first_screen = f64::from(self.layout.viewport_height);
        if let Some(rect) = self
            .layout
            .section_rect(ANCHORED_SECTION)
            .filter(|rect| rect.top >= first_screen)
        {
            self._anchor = Some(self.page.anchor_element(
                PageLayout::section_element(ANCHORED_SECTION),
                rect,
                options,
                self.config.trigger.anchor_offset,
            ));
        }
        debug!(sections = self.sections.len(), "Page triggers registered");
        Ok(())
    }

    fn start_loader(&mut self) -> Result<()> {
        let reduced = self
            .config
            .autoplay
            .reduced_motion
            .resolve(self.prefers_reduced);
        if reduced || self.config.reveal.lines.is_empty() {
            info!(reduced, "Loader skipped");
            return Ok(());
        }

        let phases = RevealPhase::phases_from_config(&self.config.reveal);
        let mut options = reveal_options(&self.config.reveal)?;
        if self.config.reveal.lock_page_scroll {
            options = options.with_lock(self.page_lock.clone());
        }

        let playback = play_reveal_timeline(&self.clock, phases, options);
        self.page.attach_reveal(&playback);
        self.loader = Some(playback);
        info!(lines = self.config.reveal.lines.len(), "Loader started");
        Ok(())
    }

    /// Advance one frame at the clock's own time
    pub fn tick(&mut self) -> Result<()> {
        self.clock.tick_now()?;
        self.after_frame();
        Ok(())
    }

    /// Advance one frame at `now`
    pub fn tick_at(&mut self, now: Duration) -> Result<()> {
        self.clock.tick(now)?;
        self.after_frame();
        Ok(())
    }

    fn after_frame(&mut self) {
        if self.loader.as_ref().is_some_and(RevealPlayback::is_finished) {
            if let Some(loader) = self.loader.take() {
                info!(state = ?loader.state(), "Loader finished");
            }
        }

        // The article pauses its autoplay while the page has it off screen
        if let Some(tracker) = &self.article_tracker {
            let in_view = tracker.flag.get();
            if in_view != self.article_in_view {
                self.article_in_view = in_view;
                self.article.send(ContainerEvent::Visibility(in_view));
            }
        }
    }

    /// Whether the next poll should wait only one frame
    pub fn wants_frame(&self) -> bool {
        self.clock.wants_frame()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let viewport = height.saturating_sub(1);
        self.layout = PageLayout::build(&self.content, width, viewport);
        self.page.send(ContainerEvent::Resize {
            content_height: self.layout.content_height(),
            viewport_height: f64::from(viewport),
            viewport_width: f64::from(width),
        });
        self.article.send(ContainerEvent::Resize {
            content_height: self.layout.article_content_height(),
            viewport_height: self.layout.article_viewport_height(),
            viewport_width: f64::from(self.layout.text_width),
        });
        self.article.set_units(self.layout.paragraphs.clone());

        for index in 0..self.layout.sections.len() {
            if let Some(rect) = self.layout.section_rect(index) {
                self.page
                    .update_rect(PageLayout::section_element(index), rect);
            }
        }
        self.page
            .update_rect(self.layout.article_element(), self.layout.article_rect());
        debug!(width, height, "Layout rebuilt");
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('s') => self.skip_loader(),
            KeyCode::Char('m') => self.toggle_reduced_motion(),
            _ if self.loader.is_some() => {}
            KeyCode::Char('j') | KeyCode::Down => self.wheel(WHEEL_ROWS),
            KeyCode::Char('k') | KeyCode::Up => self.wheel(-WHEEL_ROWS),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.wheel(f64::from(self.layout.viewport_height))
            }
            KeyCode::PageUp => self.wheel(-f64::from(self.layout.viewport_height)),
            KeyCode::Char('g') | KeyCode::Home => self.page.scroll_to(0.0, None, None),
            KeyCode::Char('G') | KeyCode::End => {
                self.page.scroll_to(self.page.max(), None, None)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                self.jump_to_section(index);
            }
            KeyCode::Tab => self.toggle_article_focus(),
            KeyCode::Char('p') => self.toggle_autoplay_pause(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let over_article = self.article_area.and_then(|area| {
            let inside = mouse.column >= area.x
                && mouse.column < area.x + area.width
                && mouse.row >= area.y
                && mouse.row < area.y + area.height;
            inside.then(|| f64::from(mouse.row - area.y))
        });

        match mouse.kind {
            MouseEventKind::ScrollDown => self.wheel_at(over_article.is_some(), WHEEL_ROWS),
            MouseEventKind::ScrollUp => self.wheel_at(over_article.is_some(), -WHEEL_ROWS),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => match over_article {
                Some(y) => {
                    if !self.pointer_in_article {
                        self.pointer_in_article = true;
                        self.article.send(ContainerEvent::PointerEnter);
                    }
                    self.article.send(ContainerEvent::PointerMove { y });
                }
                None => self.pointer_left(),
            },
            _ => {}
        }
    }

    /// The terminal lost focus; treat it like the pointer leaving
    pub fn focus_lost(&mut self) {
        self.pointer_left();
    }

    fn pointer_left(&mut self) {
        if self.pointer_in_article {
            self.pointer_in_article = false;
            self.article.send(ContainerEvent::PointerLeave);
        }
    }

    fn wheel(&mut self, delta: f64) {
        self.wheel_at(self.article_focused, delta);
    }

    fn wheel_at(&mut self, article: bool, delta: f64) {
        let target = if article { &self.article } else { &self.page };
        target.send(ContainerEvent::Wheel { delta });
    }

    fn jump_to_section(&mut self, index: usize) {
        if let Some(rect) = self.layout.section_rect(index) {
            let position = anchor_position(&rect, self.config.trigger.anchor_offset);
            debug!(index, position, "Jumping to section");
            self.page.scroll_to(position, None, None);
        }
    }

    fn toggle_article_focus(&mut self) {
        self.article_focused = !self.article_focused;
        let event = if self.article_focused {
            ContainerEvent::Focus
        } else {
            ContainerEvent::Blur
        };
        self.article.send(event);
    }

    fn toggle_autoplay_pause(&mut self) {
        if let Some(handle) = &self.autoplay {
            match handle.state() {
                Some(AutoplayState::Running) => handle.hold(),
                Some(AutoplayState::SuspendedByUser) => handle.resume_now(),
                _ => {}
            }
        }
    }

    /// Flip the host reduced-motion preference; both containers react on their next frame
    pub fn toggle_reduced_motion(&mut self) {
        self.prefers_reduced = !self.prefers_reduced;
        info!(prefers_reduced = self.prefers_reduced, "Reduced motion toggled");
        let event = ContainerEvent::ReducedMotionChanged(self.prefers_reduced);
        self.page.send(event.clone());
        self.article.send(event);
    }

    /// Cancel the loader; its completion callbacks never run
    pub fn skip_loader(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.cancel();
            info!("Loader skipped by user");
        }
    }

    // Render accessors

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn loader_frame(&self) -> Option<RevealFrame> {
        self.loader.as_ref().map(RevealPlayback::frame)
    }

    pub fn loader_lines(&self) -> &[String] {
        &self.config.reveal.lines
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some()
    }

    pub fn page_position(&self) -> f64 {
        self.page.position()
    }

    pub fn article_position(&self) -> f64 {
        self.article.position()
    }

    pub fn article_visibility(&self) -> Vec<VisibilityEntry> {
        self.article.visibility()
    }

    pub fn focused_paragraph(&self) -> Option<usize> {
        self.article.snapshot().focused
    }

    pub fn section_in_view(&self, index: usize) -> bool {
        self.sections.get(index).is_some_and(|tracked| tracked.flag.get())
    }

    pub fn article_in_view(&self) -> bool {
        self.article_in_view
    }

    pub fn article_focused(&self) -> bool {
        self.article_focused
    }

    pub fn autoplay_state(&self) -> Option<AutoplayState> {
        self.article.autoplay_state()
    }

    pub fn status_text(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn reduced_motion(&self) -> bool {
        self.config
            .autoplay
            .reduced_motion
            .resolve(self.prefers_reduced)
    }

    pub fn set_article_area(&mut self, area: Option<Area>) {
        self.article_area = area;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_core::ReducedMotion;
    use crossterm::event::KeyEventKind;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        app: App,
        now: Duration,
    }

    impl Harness {
        fn new(config: ChoreoConfig) -> Self {
            let app = App::with_clock(
                FrameClock::new(),
                config,
                SiteContent::default(),
                false,
                80,
                24,
            )
            .unwrap();
            Self {
                app,
                now: Duration::ZERO,
            }
        }

        fn frames(&mut self, count: usize) {
            for _ in 0..count {
                self.now += FRAME;
                self.app.tick_at(self.now).unwrap();
            }
        }

        fn key(&mut self, code: KeyCode) {
            self.app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        }

        fn scroll_page_down(&mut self) {
            self.app.handle_mouse(MouseEvent {
                kind: MouseEventKind::ScrollDown,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            });
        }
    }

    fn without_loader() -> ChoreoConfig {
        let mut config = ChoreoConfig::default();
        config.reveal.lines.clear();
        config
    }

    #[test]
    fn test_loader_locks_page_scroll() {
        let mut harness = Harness::new(ChoreoConfig::default());
        harness.frames(1);
        assert!(harness.app.is_loading());
        assert!(harness.app.page_lock.is_locked());

        harness.scroll_page_down();
        harness.frames(30);
        assert_eq!(harness.app.page_position(), 0.0);
    }

    #[test]
    fn test_skip_loader_releases_page() {
        let mut harness = Harness::new(ChoreoConfig::default());
        harness.frames(5);
        harness.key(KeyCode::Char('s'));
        assert!(!harness.app.is_loading());
        assert!(!harness.app.page_lock.is_locked());

        harness.scroll_page_down();
        harness.frames(30);
        assert!(harness.app.page_position() > 0.0);
    }

    #[test]
    fn test_loader_finishes_on_its_own() {
        let mut harness = Harness::new(ChoreoConfig::default());
        // Two phases of 4000 and 5800 ms, a fade, a pause and the settle
        harness.frames(700);
        assert!(!harness.app.is_loading());
        assert!(!harness.app.page_lock.is_locked());
    }

    #[test]
    fn test_reduced_motion_skips_loader() {
        let mut config = ChoreoConfig::default();
        config.autoplay.reduced_motion = ReducedMotion::On;
        let harness = Harness::new(config);
        assert!(!harness.app.is_loading());
        assert!(harness.app.reduced_motion());
    }

    #[test]
    fn test_article_autoplays_while_on_screen() {
        let mut harness = Harness::new(without_loader());
        harness.frames(120);
        assert!(harness.app.article_in_view());
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::Running));
        assert!(harness.app.article_position() > 0.0);
        assert_eq!(
            harness.app.status_text(),
            "Article auto-scrolling. Hover to control manually."
        );
    }

    #[test]
    fn test_motion_toggle_stops_article() {
        let mut harness = Harness::new(without_loader());
        harness.frames(60);
        harness.key(KeyCode::Char('m'));
        harness.frames(1);
        let frozen = harness.app.article_position();
        harness.frames(60);

        assert_eq!(
            harness.app.autoplay_state(),
            Some(AutoplayState::SuspendedByMotionPreference)
        );
        assert_eq!(harness.app.article_position(), frozen);
    }

    #[test]
    fn test_focus_suspends_autoplay() {
        let mut harness = Harness::new(without_loader());
        harness.frames(10);
        harness.key(KeyCode::Tab);
        harness.frames(1);
        assert!(harness.app.article_focused());
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::SuspendedByUser));
    }

    #[test]
    fn test_pointer_hover_suspends_and_leave_rearms() {
        let mut harness = Harness::new(without_loader());
        harness.app.set_article_area(Some(Area::new(4, 12, 70, 12)));
        harness.frames(10);

        let hover = |kind, column, row| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        harness
            .app
            .handle_mouse(hover(MouseEventKind::Moved, 10, 18));
        harness.frames(1);
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::SuspendedByUser));

        harness
            .app
            .handle_mouse(hover(MouseEventKind::Moved, 0, 0));
        // Idle timeout is 3000 ms
        harness.frames(200);
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::Running));
    }

    #[test]
    fn test_hold_key_stops_article_until_pressed_again() {
        let mut harness = Harness::new(without_loader());
        harness.frames(10);
        harness.key(KeyCode::Char('p'));
        harness.frames(1);
        let held = harness.app.article_position();

        // Well past the idle timeout
        harness.frames(400);
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::SuspendedByUser));
        assert_eq!(harness.app.article_position(), held);

        harness.key(KeyCode::Char('p'));
        assert_eq!(harness.app.autoplay_state(), Some(AutoplayState::Running));
        harness.frames(10);
        assert!(harness.app.article_position() > held);
    }

    #[test]
    fn test_article_off_screen_stops_moving() {
        let mut harness = Harness::new(without_loader());
        harness.frames(10);
        harness.key(KeyCode::End);
        harness.frames(150);
        assert!(!harness.app.article_in_view());

        let parked = harness.app.article_position();
        harness.frames(60);
        assert_eq!(harness.app.article_position(), parked);
    }

    #[test]
    fn test_app_runs_on_the_shared_clock() {
        let app = App::new(without_loader(), SiteContent::default(), false, 80, 24).unwrap();
        let before = app.clock.frames();
        FrameClock::global().tick_now().unwrap();
        assert_eq!(app.clock.frames(), before + 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut harness = Harness::new(without_loader());
        harness.app.handle_key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        });
        assert!(harness.app.should_quit);
    }
}
