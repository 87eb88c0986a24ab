use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Approximate text measurement without a font rasterizer.
///
/// Widths come from the unicode display width of the text (wide CJK and
/// emoji count as two cells) times an average glyph width per cell.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    /// Width of one display cell as a fraction of the font size.
    pub cell_width_em: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self { cell_width_em: 0.6 }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str, font_px: f64) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.cell_width(font_px)
    }

    fn cell_width(&self, font_px: f64) -> f64 {
        font_px * self.cell_width_em
    }

    /// Cut `text` so it fits in `max_width`, marking the cut with an ellipsis.
    pub fn ellipsize<'a>(&self, text: &'a str, font_px: f64, max_width: f64) -> Cow<'a, str> {
        if self.text_width(text, font_px) <= max_width {
            return Cow::Borrowed(text);
        }

        let cell = self.cell_width(font_px);
        if cell <= 0.0 {
            return Cow::Borrowed(text);
        }
        // Reserve one cell for the ellipsis.
        let budget = (max_width / cell).floor() as usize;
        let Some(budget) = budget.checked_sub(1) else {
            return Cow::Owned(String::new());
        };

        let mut used = 0;
        let mut out = String::new();
        for c in text.chars() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > budget {
                break;
            }
            used += w;
            out.push(c);
        }
        out.push(ELLIPSIS);
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("User", 10.0), 4.0 * 6.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // Full-width characters take two cells.
        assert_eq!(m.text_width("ユーザー", 10.0), 8.0 * 6.0);
    }

    #[test]
    fn test_ellipsize_short_text_is_untouched() {
        let m = TextMetrics::default();
        assert!(matches!(m.ellipsize("id", 10.0, 100.0), Cow::Borrowed("id")));
    }

    #[test]
    fn test_ellipsize_cuts_long_text() {
        let m = TextMetrics::default();
        // 5 cells of 6px fit in 30px: four characters plus the ellipsis.
        assert_eq!(m.ellipsize("created_at", 10.0, 30.0), "crea…");
    }

    #[test]
    fn test_ellipsize_respects_wide_chars() {
        let m = TextMetrics::default();
        assert_eq!(m.ellipsize("ユーザー", 10.0, 30.0), "ユー…");
    }

    #[test]
    fn test_ellipsize_no_room() {
        let m = TextMetrics::default();
        assert_eq!(m.ellipsize("abc", 10.0, 3.0), "");
    }
}
