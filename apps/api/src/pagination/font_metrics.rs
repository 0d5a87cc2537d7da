//! Static font-metric tables for the two type families the templates use.
//!
//! Character widths are in em units (relative to font size). This is an
//! approximation: a browser shapes real glyphs, but the tables are close enough to
//! predict line counts for resume-sized text within a line or so, which is what the
//! offline `MetricProbe` needs. All tables cover ASCII 0x20..=0x7E
//! (index = `(char as usize) - 32`); anything else uses `average_char_width`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// `font-sans` (Modern, Creative). Inter-like humanist sans.
    Sans,
    /// `font-serif` (Classic). Garamond-like old-style serif.
    Serif,
}

pub struct FontMetricTable {
    pub family: FontFamily,
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Number of lines `text` occupies when greedily word-wrapped at `max_width_em`.
    ///
    /// Explicit `\n` starts a new line. A word wider than the line is broken across
    /// as many lines as it needs, like `break-all`. Blank text occupies no lines.
    pub fn wrapped_lines(&self, text: &str, max_width_em: f32) -> usize {
        if text.trim().is_empty() {
            return 0;
        }
        let max_width = max_width_em.max(self.average_char_width);
        text.split('\n')
            .map(|line| self.wrap_line(line, max_width))
            .sum()
    }

    fn wrap_line(&self, line: &str, max_width: f32) -> usize {
        let mut lines = 1usize;
        let mut current = 0.0_f32;
        let mut first = true;

        for word in line.split_whitespace() {
            let word_w = self.measure_str(word);
            let space_w = if first { 0.0 } else { self.space_width };

            if word_w > max_width {
                // Overlong word: starts on a fresh line and spills over.
                if !first {
                    lines += 1;
                }
                let spill = (word_w / max_width).ceil() as usize;
                lines += spill - 1;
                current = word_w - (spill - 1) as f32 * max_width;
                first = false;
            } else if !first && current + space_w + word_w > max_width {
                lines += 1;
                current = word_w;
            } else {
                current += space_w + word_w;
                first = false;
            }
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static SANS_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Sans,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0-9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A-M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N-Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a-m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n-z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    space_width: 0.25,
};

static SERIF_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Serif,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.21, 0.26, 0.32, 0.48, 0.48, 0.76, 0.57, 0.19, 0.28, 0.28, 0.33, 0.50, 0.24, 0.28, 0.24, 0.26,
        // 0-9
        0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48,
        // :     ;     <     =     >     ?     @
        0.24, 0.24, 0.50, 0.50, 0.50, 0.43, 0.87,
        // A-M
        0.57, 0.52, 0.52, 0.57, 0.48, 0.43, 0.57, 0.57, 0.21, 0.33, 0.52, 0.45, 0.66,
        // N-Z
        0.57, 0.61, 0.48, 0.61, 0.52, 0.43, 0.48, 0.57, 0.57, 0.76, 0.52, 0.52, 0.48,
        // [     \     ]     ^     _     `
        0.24, 0.26, 0.24, 0.40, 0.48, 0.29,
        // a-m
        0.48, 0.48, 0.43, 0.48, 0.48, 0.26, 0.48, 0.48, 0.19, 0.19, 0.45, 0.19, 0.71,
        // n-z
        0.48, 0.48, 0.48, 0.48, 0.28, 0.37, 0.33, 0.48, 0.43, 0.61, 0.43, 0.43, 0.37,
        // {     |     }     ~
        0.28, 0.22, 0.28, 0.50,
    ],
    average_char_width: 0.44,
    space_width: 0.21,
};

pub fn get_metrics(family: FontFamily) -> &'static FontMetricTable {
    match family {
        FontFamily::Sans => &SANS_TABLE,
        FontFamily::Serif => &SERIF_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontFamily::Sans);
        // R(0.61) + u(0.56) + s(0.44) + t(0.39)
        let width = metrics.measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(FontFamily::Serif);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_blank_text_has_no_lines() {
        let metrics = get_metrics(FontFamily::Sans);
        assert_eq!(metrics.wrapped_lines("", 40.0), 0);
        assert_eq!(metrics.wrapped_lines("  \n ", 40.0), 0);
    }

    #[test]
    fn test_short_text_is_one_line() {
        let metrics = get_metrics(FontFamily::Sans);
        assert_eq!(metrics.wrapped_lines("Senior Engineer", 40.0), 1);
    }

    #[test]
    fn test_long_text_wraps() {
        let metrics = get_metrics(FontFamily::Sans);
        let text = "word ".repeat(40);
        // 40 words * ~2.0em plus spaces on a 20em line
        let lines = metrics.wrapped_lines(&text, 20.0);
        assert!((4..=6).contains(&lines), "got {lines}");
    }

    #[test]
    fn test_explicit_newlines_start_new_lines() {
        let metrics = get_metrics(FontFamily::Serif);
        assert_eq!(metrics.wrapped_lines("one\ntwo\nthree", 40.0), 3);
    }

    #[test]
    fn test_overlong_word_spills_over_lines() {
        let metrics = get_metrics(FontFamily::Sans);
        // 30 'm' at 0.83em = 24.9em on a 10em line -> 3 lines
        let word = "m".repeat(30);
        assert_eq!(metrics.wrapped_lines(&word, 10.0), 3);
        assert_eq!(metrics.wrapped_lines(&format!("a {word}"), 10.0), 4);
    }

    #[test]
    fn test_serif_narrower_than_sans() {
        let text = "Architected distributed caching layer";
        assert!(
            get_metrics(FontFamily::Serif).measure_str(text)
                < get_metrics(FontFamily::Sans).measure_str(text)
        );
    }
}
