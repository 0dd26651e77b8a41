//! Page geometry in terminal rows
//!
//! Everything here is measured in cells: one row of the page is one unit of
//! scroll distance for both the page and the article container.

use choreo_core::content::SiteContent;
use choreo_core::{ElementId, Extent, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_TEXT_WIDTH: u16 = 96;
const SIDE_MARGIN: u16 = 2;
const MIN_ARTICLE_ROWS: u16 = 6;
const MAX_ARTICLE_ROWS: u16 = 16;

/// Greedy word wrap by display width; words wider than `width` are split
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        let needed = if current.is_empty() {
            word_width
        } else {
            current_width + 1 + word_width
        };
        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        // Hard-split an overlong word
        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// How a page row is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// Headline line by index
    Headline(usize),
    Body,
    SectionTitle,
    FeatureTitle,
    /// One row of the article box; `0` is its top border
    Article(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLine {
    pub text: String,
    pub kind: LineKind,
    pub section: usize,
}

/// A wrapped article row and the paragraph it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleLine {
    pub text: String,
    pub paragraph: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub width: u16,
    pub viewport_height: u16,
    pub text_width: u16,
    pub left: u16,
    pub lines: Vec<PageLine>,
    /// Page rows covered by each section, in page order
    pub sections: Vec<Extent>,
    /// Page rows covered by the article box, borders included
    pub article_box: Extent,
    pub article_lines: Vec<ArticleLine>,
    /// Article rows covered by each paragraph
    pub paragraphs: Vec<Extent>,
}

impl PageLayout {
    /// Element ids: sections count up from 1, the article box follows them
    pub fn section_element(index: usize) -> ElementId {
        ElementId(index as u64 + 1)
    }

    pub fn article_element(&self) -> ElementId {
        ElementId(self.sections.len() as u64 + 1)
    }

    pub fn build(content: &SiteContent, width: u16, viewport_height: u16) -> Self {
        let text_width = width.saturating_sub(SIDE_MARGIN * 2).clamp(10, MAX_TEXT_WIDTH);
        let left = width.saturating_sub(text_width) / 2;
        let mut layout = Self {
            width,
            viewport_height,
            text_width,
            left,
            ..Self::default()
        };

        // Hero
        let start = layout.lines.len();
        layout.push(LineKind::Blank, String::new(), 0);
        for (index, line) in content.hero.headline.iter().enumerate() {
            layout.push(LineKind::Headline(index), line.clone(), 0);
        }
        layout.push(LineKind::Blank, String::new(), 0);
        for line in wrap_text(&content.hero.blurb, text_width as usize) {
            layout.push(LineKind::Body, line, 0);
        }
        layout.push_gap(0);
        layout.close_section(start);

        // About, with the article box
        let start = layout.lines.len();
        layout.push(LineKind::SectionTitle, content.about.title.clone(), 1);
        layout.push(LineKind::Blank, String::new(), 1);
        layout.build_article(content, viewport_height);
        layout.push_gap(1);
        layout.close_section(start);

        // Features
        for (index, feature) in content.features.iter().enumerate() {
            let section = index + 2;
            let start = layout.lines.len();
            layout.push(LineKind::FeatureTitle, feature.title.clone(), section);
            for line in wrap_text(&feature.summary, text_width as usize) {
                layout.push(LineKind::Body, line, section);
            }
            layout.push_gap(section);
            layout.close_section(start);
        }

        layout
    }

    fn push(&mut self, kind: LineKind, text: String, section: usize) {
        self.lines.push(PageLine {
            text,
            kind,
            section,
        });
    }

    fn push_gap(&mut self, section: usize) {
        self.push(LineKind::Blank, String::new(), section);
        self.push(LineKind::Blank, String::new(), section);
    }

    fn close_section(&mut self, start: usize) {
        let height = self.lines.len() - start;
        self.sections.push(Extent::new(start as f64, height as f64));
    }

    fn build_article(&mut self, content: &SiteContent, viewport_height: u16) {
        let inner_width = self.text_width.saturating_sub(4).max(1) as usize;
        let mut rows = Vec::new();
        let mut paragraphs = Vec::new();
        for (index, paragraph) in content.about.paragraphs().enumerate() {
            if index > 0 {
                rows.push(ArticleLine {
                    text: String::new(),
                    paragraph: None,
                });
            }
            let top = rows.len();
            rows.extend(wrap_text(paragraph, inner_width).into_iter().map(|text| ArticleLine {
                text,
                paragraph: Some(index),
            }));
            paragraphs.push(Extent::new(top as f64, (rows.len() - top) as f64));
        }

        let inner_rows = (viewport_height / 2).clamp(MIN_ARTICLE_ROWS, MAX_ARTICLE_ROWS);
        let box_rows = inner_rows + 2;
        let top = self.lines.len();
        for row in 0..box_rows {
            self.push(LineKind::Article(row), String::new(), 1);
        }
        self.article_box = Extent::new(top as f64, f64::from(box_rows));
        self.article_lines = rows;
        self.paragraphs = paragraphs;
    }

    pub fn content_height(&self) -> f64 {
        self.lines.len() as f64
    }

    /// Rows the article scrolls through
    pub fn article_content_height(&self) -> f64 {
        self.article_lines.len() as f64
    }

    /// Visible article rows, inside the border
    pub fn article_viewport_height(&self) -> f64 {
        (self.article_box.height - 2.0).max(0.0)
    }

    pub fn section_rect(&self, index: usize) -> Option<Rect> {
        self.sections.get(index).map(|extent| self.rect_for(extent))
    }

    pub fn article_rect(&self) -> Rect {
        self.rect_for(&self.article_box)
    }

    fn rect_for(&self, extent: &Extent) -> Rect {
        Rect::new(
            f64::from(self.left),
            extent.top,
            f64::from(self.text_width),
            extent.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|line| line.width() <= 10));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_measures_wide_chars() {
        let lines = wrap_text("日本語 テキスト", 6);
        assert_eq!(lines, vec!["日本語", "テキス", "ト"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_sections_cover_page_in_order() {
        let content = SiteContent::default();
        let layout = PageLayout::build(&content, 80, 24);
        assert_eq!(layout.sections.len(), content.section_titles().len());
        let mut expected_top = 0.0;
        for section in &layout.sections {
            assert_eq!(section.top, expected_top);
            expected_top = section.bottom();
        }
        assert_eq!(expected_top, layout.content_height());
    }

    #[test]
    fn test_article_box_sits_in_about_section() {
        let layout = PageLayout::build(&SiteContent::default(), 80, 24);
        let about = layout.sections[1];
        assert!(layout.article_box.top >= about.top);
        assert!(layout.article_box.bottom() <= about.bottom());
        assert_eq!(layout.article_viewport_height(), 12.0);
        // The default article is longer than its box, so it can autoplay
        assert!(layout.article_content_height() > layout.article_viewport_height());
    }

    #[test]
    fn test_paragraph_extents_skip_separators() {
        let layout = PageLayout::build(&SiteContent::default(), 80, 24);
        assert_eq!(layout.paragraphs.len(), 4);
        for pair in layout.paragraphs.windows(2) {
            assert_eq!(pair[1].top, pair[0].bottom() + 1.0);
        }
        let last = layout.paragraphs[3];
        assert_eq!(last.bottom(), layout.article_content_height());
    }

    #[test]
    fn test_element_ids_are_distinct() {
        let layout = PageLayout::build(&SiteContent::default(), 80, 24);
        let last_section = PageLayout::section_element(layout.sections.len() - 1);
        assert_ne!(last_section, layout.article_element());
    }
}
