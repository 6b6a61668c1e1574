//! Glyph themes that turn a completed fraction into a fixed-width bar body.
//!
//! Two styles exist and they draw visibly different bars:
//!
//! * a **palette** theme interpolates the column at the boundary through an
//!   ordered gradient of glyphs (`' '`, `'▏'`, `'▎'`, ... `'█'`), so progress moves
//!   smoothly in sub-column steps;
//! * a **tip** theme only knows `empty`, `filled` and a single `tip` glyph that
//!   marks the boundary column (`=====>    `).
//!
//! Rendering is a pure function of `(fraction, width)`.

use unicode_width::UnicodeWidthChar;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Style {
    Palette(Vec<char>),
    Tip { empty: char, filled: char, tip: char },
}

/// An immutable glyph set plus the rule for laying it out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    style: Style,
}

impl Theme {
    /// Creates a gradient theme. `glyphs` runs from empty to full.
    pub fn palette(glyphs: impl Into<Vec<char>>) -> Result<Theme> {
        let glyphs = glyphs.into();
        if glyphs.len() < 2 {
            return Err(Error::PaletteTooShort { len: glyphs.len() });
        }
        check_single_column(&glyphs)?;
        Ok(Theme {
            style: Style::Palette(glyphs),
        })
    }

    /// Creates a three-glyph theme without sub-column interpolation.
    pub fn tip(empty: char, filled: char, tip: char) -> Result<Theme> {
        check_single_column(&[empty, filled, tip])?;
        Ok(Theme {
            style: Style::Tip { empty, filled, tip },
        })
    }

    /// Unicode block elements, falling back to `" .-=#"`.
    pub fn blocks(unicode: bool) -> Theme {
        if unicode {
            builtin(&[' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'])
        } else {
            builtin(&[' ', '.', '-', '=', '#'])
        }
    }

    pub fn braille(unicode: bool) -> Theme {
        if unicode {
            builtin(&[' ', '⡀', '⡄', '⡆', '⡇', '⣇', '⣧', '⣷', '⣿'])
        } else {
            builtin(&[' ', '.', ',', '*', 'o', 'O', '@'])
        }
    }

    pub fn dots(unicode: bool) -> Theme {
        if unicode {
            builtin(&[' ', '⠁', '⠃', '⠇', '⠏', '⠟', '⠿', '⡿', '⣿'])
        } else {
            builtin(&[' ', '.', ':', ';', '8'])
        }
    }

    pub fn pixels(unicode: bool) -> Theme {
        if unicode {
            builtin(&[' ', '⣀', '⣤', '⣶', '⣿', '⣿', '⣿', '⣿', '⣿'])
        } else {
            builtin(&[' ', '.', ':', '|', '#'])
        }
    }

    pub fn shades(unicode: bool) -> Theme {
        if unicode {
            builtin(&['░', '░', '▒', '▒', '▓', '▓', '█', '█', '█'])
        } else {
            builtin(&['.', '-', '=', '+', '#'])
        }
    }

    /// The classic `[=====>    ]` bar body.
    pub fn ascii_bar() -> Theme {
        Theme {
            style: Style::Tip {
                empty: ' ',
                filled: '=',
                tip: '>',
            },
        }
    }

    /// Renders `fraction` of `width` columns.
    ///
    /// The result is always exactly `width` columns wide. `fraction` is clamped
    /// into `[0, 1]`; NaN counts as zero.
    pub fn render(&self, fraction: f64, width: usize) -> String {
        let mut out = String::with_capacity(width * 3);
        self.render_into(&mut out, fraction, width);
        out
    }

    /// Same as [`Theme::render`], appending to an existing buffer.
    pub fn render_into(&self, out: &mut String, fraction: f64, width: usize) {
        if width == 0 {
            return;
        }
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let scaled = fraction * width as f64;
        let filled = (scaled.floor() as usize).min(width);

        match &self.style {
            Style::Palette(glyphs) => {
                let last = glyphs.len() - 1;
                let remainder = scaled - filled as f64;
                let tip = ((remainder * last as f64).floor() as usize).min(last);
                push_n(out, glyphs[last], filled);
                if filled < width {
                    out.push(glyphs[tip]);
                    push_n(out, glyphs[0], width - filled - 1);
                }
            }
            Style::Tip { empty, filled: full, tip } => {
                push_n(out, *full, filled);
                if filled < width {
                    out.push(*tip);
                    push_n(out, *empty, width - filled - 1);
                }
            }
        }
    }

    /// True for gradient themes.
    pub fn is_palette(&self) -> bool {
        matches!(self.style, Style::Palette(_))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::blocks(false)
    }
}

fn builtin(glyphs: &[char]) -> Theme {
    Theme {
        style: Style::Palette(glyphs.to_vec()),
    }
}

fn check_single_column(glyphs: &[char]) -> Result<()> {
    match glyphs.iter().find(|g| g.width() != Some(1)) {
        Some(&glyph) => Err(Error::WideGlyph { glyph }),
        None => Ok(()),
    }
}

fn push_n(out: &mut String, glyph: char, n: usize) {
    out.extend(std::iter::repeat(glyph).take(n));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_builtins() -> Vec<Theme> {
        let mut themes = vec![Theme::ascii_bar()];
        for unicode in [false, true] {
            themes.push(Theme::blocks(unicode));
            themes.push(Theme::braille(unicode));
            themes.push(Theme::dots(unicode));
            themes.push(Theme::pixels(unicode));
            themes.push(Theme::shades(unicode));
        }
        themes
    }

    #[test]
    fn palette_interpolates_tip_column() {
        let theme = Theme::palette(vec![' ', '.', '-', '=', '#']).unwrap();
        assert_eq!(theme.render(0.0, 4), "    ");
        assert_eq!(theme.render(0.5, 4), "##  ");
        // 0.6 * 4 = 2.4, remainder 0.4 * 4 = 1.6 -> index 1
        assert_eq!(theme.render(0.6, 4), "##. ");
        // 0.7 * 4 = 2.8, remainder 0.8 * 4 = 3.2 -> index 3
        assert_eq!(theme.render(0.7, 4), "##= ");
        assert_eq!(theme.render(1.0, 4), "####");
    }

    #[test]
    fn tip_theme_marks_single_column() {
        let theme = Theme::ascii_bar();
        assert_eq!(theme.render(0.0, 5), ">    ");
        assert_eq!(theme.render(0.5, 10), "=====>    ");
        assert_eq!(theme.render(0.59, 10), "=====>    ");
        assert_eq!(theme.render(1.0, 5), "=====");
    }

    #[test]
    fn zero_width_is_empty() {
        for theme in all_builtins() {
            assert_eq!(theme.render(0.3, 0), "");
        }
    }

    #[test]
    fn output_is_exactly_width_columns() {
        use unicode_width::UnicodeWidthStr;

        for theme in all_builtins() {
            for width in [1usize, 2, 7, 33, 80] {
                for step in 0..=40 {
                    let fraction = step as f64 / 40.0;
                    let bar = theme.render(fraction, width);
                    assert_eq!(bar.chars().count(), width);
                    assert_eq!(bar.width(), width);
                }
            }
        }
    }

    #[test]
    fn empty_and_full_extremes() {
        let theme = Theme::blocks(true);
        assert_eq!(theme.render(0.0, 6), "      ");
        assert_eq!(theme.render(1.0, 6), "██████");

        let shades = Theme::shades(false);
        assert_eq!(shades.render(0.0, 3), "...");
        assert_eq!(shades.render(1.0, 3), "###");
    }

    #[test]
    fn full_glyph_count_is_monotonic() {
        let theme = Theme::blocks(true);
        let width = 23;
        let mut previous = 0;
        for step in 0..=1000 {
            let fraction = step as f64 / 1000.0;
            let full = theme.render(fraction, width).chars().filter(|&c| c == '█').count();
            assert!(full >= previous, "fraction {fraction} went backwards");
            previous = full;
        }
        assert_eq!(previous, width);
    }

    #[test]
    fn out_of_range_fraction_is_clamped() {
        let theme = Theme::blocks(false);
        assert_eq!(theme.render(-0.5, 4), theme.render(0.0, 4));
        assert_eq!(theme.render(1.7, 4), theme.render(1.0, 4));
        assert_eq!(theme.render(f64::NAN, 4), theme.render(0.0, 4));
    }

    #[test]
    fn rendering_is_deterministic() {
        let theme = Theme::dots(true);
        assert_eq!(theme.render(0.4242, 17), theme.render(0.4242, 17));
    }

    #[test]
    fn construction_validates_glyphs() {
        assert!(matches!(
            Theme::palette(vec!['#']),
            Err(Error::PaletteTooShort { len: 1 })
        ));
        assert!(matches!(
            Theme::palette(vec![' ', '你']),
            Err(Error::WideGlyph { glyph: '你' })
        ));
        assert!(matches!(
            Theme::tip(' ', '=', '\t'),
            Err(Error::WideGlyph { .. })
        ));
        assert!(Theme::tip('-', '#', '>').unwrap().render(0.5, 4) == "##>-");
        assert!(!Theme::ascii_bar().is_palette());
        assert!(Theme::default().is_palette());
    }
}
