use ratatui::{
    layout::Rect,
    style::Style,
    widgets::Block,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use choreo_core::reveal::RevealFrame;

use crate::theme::{blend, Theme};

/// Full-screen typewriter loader
pub struct LoaderWidget;

impl LoaderWidget {
    /// Draw `reveal` over `lines`, one phase per line with a blank row between
    pub fn render(frame: &mut Frame, area: Rect, reveal: &RevealFrame, lines: &[String], theme: &Theme) {
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);
        if lines.is_empty() || area.width == 0 || area.height == 0 {
            return;
        }

        let widest = lines.iter().map(|line| line.width()).max().unwrap_or(0) as u16;
        let left = area.x + area.width.saturating_sub(widest) / 2;
        let block_height = (lines.len() as u16 * 2).saturating_sub(1);
        let top = area.y + area.height.saturating_sub(block_height) / 2;

        let buf = frame.buffer_mut();
        for (index, (line, phase)) in lines.iter().zip(&reveal.phases).enumerate() {
            let y = top + index as u16 * 2;
            if y >= area.bottom() || !phase.visible {
                continue;
            }

            let revealed: String = line.chars().take(phase.revealed).collect();
            let fg = blend(theme.headline, theme.bg0, phase.opacity);
            let max_width = area.right().saturating_sub(left) as usize;
            buf.set_stringn(left, y, &revealed, max_width, Style::default().fg(fg).bg(theme.bg0));

            let Some(cursor) = phase.cursor.filter(|cursor| cursor.on) else {
                continue;
            };
            let start = left + cursor.x.round().max(0.0) as u16;
            let width = cursor.width.round().max(1.0) as u16;
            for x in start..start.saturating_add(width).min(area.right()) {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_bg(theme.cursor);
                }
            }
        }
    }
}
