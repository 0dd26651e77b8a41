use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey2: Color,

    // Palette colors
    pub yellow: Color,
    pub green: Color,

    // Semantic colors
    pub headline: Color,
    pub highlight: Color,
    pub cursor: Color,
    pub border: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Dark page with a warm highlight, like the loader screen
        Self {
            bg0: Color::Rgb(0x0b, 0x0b, 0x0b),
            bg1: Color::Rgb(0x1c, 0x1b, 0x1a),
            bg2: Color::Rgb(0x32, 0x30, 0x2f),
            fg0: Color::Rgb(0xf2, 0xf0, 0xeb),
            fg1: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            yellow: Color::Rgb(0xf4, 0xc4, 0x30),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            headline: Color::Rgb(0xf2, 0xf0, 0xeb),
            highlight: Color::Rgb(0xf4, 0xc4, 0x30),
            cursor: Color::Rgb(0xf4, 0xc4, 0x30),
            border: Color::Rgb(0x45, 0x40, 0x3d),
            accent: Color::Rgb(0xa9, 0xb6, 0x65),
        }
    }
}

impl Theme {
    /// Body text at `opacity` over the page background
    pub fn text_at(&self, opacity: f64) -> Color {
        blend(self.fg0, self.bg0, opacity)
    }
}

/// Mix `fg` over `bg`; non-RGB colors switch at half opacity
pub fn blend(fg: Color, bg: Color, opacity: f64) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    match (fg, bg) {
        (Color::Rgb(fr, fg_, fb), Color::Rgb(br, bg_, bb)) => {
            let mix = |f: u8, b: u8| (f64::from(b) + (f64::from(f) - f64::from(b)) * opacity).round() as u8;
            Color::Rgb(mix(fr, br), mix(fg_, bg_), mix(fb, bb))
        }
        _ if opacity >= 0.5 => fg,
        _ => bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        let fg = Color::Rgb(200, 100, 0);
        let bg = Color::Rgb(0, 0, 0);
        assert_eq!(blend(fg, bg, 1.0), fg);
        assert_eq!(blend(fg, bg, 0.0), bg);
        assert_eq!(blend(fg, bg, 0.5), Color::Rgb(100, 50, 0));
    }

    #[test]
    fn test_blend_named_colors() {
        assert_eq!(blend(Color::White, Color::Black, 0.7), Color::White);
        assert_eq!(blend(Color::White, Color::Black, 0.2), Color::Black);
    }
}
