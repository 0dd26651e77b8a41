use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::App;
use crate::layout::LineKind;
use crate::theme::blend;
use crate::widgets::ArticleWidget;

/// Opacity of sections that have not crossed their trigger yet
const PENDING_OPACITY: f64 = 0.35;

pub struct PageWidget;

impl PageWidget {
    /// Draw the scrolled page; returns the article body's screen area when it shows
    pub fn render(frame: &mut Frame, area: Rect, app: &App) -> Option<Rect> {
        let theme = &app.theme;
        let layout = app.layout();
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let first = app.page_position().max(0.0).floor() as usize;
        let indent = " ".repeat(layout.left as usize);
        let lines: Vec<Line> = layout
            .lines
            .iter()
            .skip(first)
            .take(area.height as usize)
            .map(|line| {
                let opacity = if app.section_in_view(line.section) {
                    1.0
                } else {
                    PENDING_OPACITY
                };
                let style = match line.kind {
                    LineKind::Blank | LineKind::Article(_) => return Line::default(),
                    LineKind::Headline(1) => Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    LineKind::Headline(_) => Style::default()
                        .fg(blend(theme.headline, theme.bg0, opacity))
                        .add_modifier(Modifier::BOLD),
                    LineKind::SectionTitle => Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                    LineKind::FeatureTitle => Style::default()
                        .fg(blend(theme.yellow, theme.bg0, opacity))
                        .add_modifier(Modifier::BOLD),
                    LineKind::Body => Style::default().fg(theme.text_at(opacity)),
                };
                Line::from(vec![Span::raw(indent.clone()), Span::styled(line.text.clone(), style)])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).style(Style::default().bg(theme.bg0)), area);

        // Article box, clipped to the screen
        let boxed = layout.article_box;
        let box_top = boxed.top as usize;
        let box_bottom = boxed.bottom() as usize;
        let screen_bottom = first + area.height as usize;
        let visible_top = box_top.max(first);
        let visible_bottom = box_bottom.min(screen_bottom);
        if visible_top >= visible_bottom {
            return None;
        }

        let box_area = Rect::new(
            area.x + layout.left,
            area.y + (visible_top - first) as u16,
            layout.text_width.min(area.width.saturating_sub(layout.left)),
            (visible_bottom - visible_top) as u16,
        );
        ArticleWidget::render(
            frame,
            box_area,
            app,
            (visible_top - box_top) as u16,
            (box_bottom - visible_bottom) as u16,
        )
    }
}
