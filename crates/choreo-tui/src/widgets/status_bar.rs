use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;

        let mode_str = if app.reduced_motion() {
            "STILL"
        } else if app.article_focused() {
            "ARTICLE"
        } else {
            "PAGE"
        };

        let status_text = if app.is_loading() {
            " LOADING | s:skip".to_string()
        } else {
            let live = app.status_text();
            if live.is_empty() {
                format!(" {}", mode_str)
            } else {
                format!(" {} | {}", mode_str, live)
            }
        };

        let help_hint = " q:quit j/k:scroll tab:article p:pause m:motion ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        let paragraph = Paragraph::new(line);
        frame.render_widget(paragraph, area);
    }
}
