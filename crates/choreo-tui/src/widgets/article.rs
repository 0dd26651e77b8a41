use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::blend;

pub struct ArticleWidget;

impl ArticleWidget {
    /// Draw the article box into `area`, which may be cut by `clipped_top`
    /// rows above and `clipped_bottom` below; returns the body area
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        app: &App,
        clipped_top: u16,
        clipped_bottom: u16,
    ) -> Option<Rect> {
        let theme = &app.theme;
        let layout = app.layout();

        let mut borders = Borders::LEFT | Borders::RIGHT;
        if clipped_top == 0 {
            borders |= Borders::TOP;
        }
        if clipped_bottom == 0 {
            borders |= Borders::BOTTOM;
        }
        let border_color = if app.article_focused() {
            theme.highlight
        } else {
            theme.border
        };
        let block = Block::default()
            .borders(borders)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return None;
        }

        let entries = app.article_visibility();
        let focused = app.focused_paragraph();
        let skipped = clipped_top.saturating_sub(1) as usize;
        let first = app.article_position().max(0.0).floor() as usize + skipped;

        let lines: Vec<Line> = layout
            .article_lines
            .iter()
            .skip(first)
            .take(inner.height as usize)
            .map(|row| {
                let Some(paragraph) = row.paragraph else {
                    return Line::default();
                };
                let opacity = entries
                    .get(paragraph)
                    .map_or(1.0, |entry| entry.opacity);
                let gutter = if focused == Some(paragraph) {
                    Span::styled("▍ ", Style::default().fg(theme.accent))
                } else {
                    Span::raw("  ")
                };
                let mut style = Style::default().fg(blend(theme.fg0, theme.bg1, opacity));
                if focused == Some(paragraph) {
                    style = style.add_modifier(Modifier::BOLD);
                }
                Line::from(vec![gutter, Span::styled(row.text.clone(), style)])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
        Some(inner)
    }
}
