use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;
use crate::widgets::{LoaderWidget, PageWidget, StatusBarWidget};

/// Draw one frame: loader or page, then the status bar
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    let article_area = match app.loader_frame() {
        Some(reveal) => {
            LoaderWidget::render(frame, chunks[0], &reveal, app.loader_lines(), &app.theme);
            None
        }
        None => PageWidget::render(frame, chunks[0], app),
    };
    app.set_article_area(article_area);

    StatusBarWidget::render(frame, chunks[1], app);
}
