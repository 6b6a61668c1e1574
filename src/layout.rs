//! Composition of a single progress line: label, bar body and suffix.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Static pieces of a line, fixed when the bar is built.
#[derive(Clone, Debug)]
pub(crate) struct Layout {
    pub label: String,
    pub show_counter: bool,
    pub delimiter: Option<char>,
    pub theme: Theme,
    label_width: usize,
}

impl Layout {
    pub fn new(label: String, show_counter: bool, delimiter: Option<char>, theme: Theme) -> Layout {
        let label_width = label.width();
        Layout {
            label,
            show_counter,
            delimiter,
            theme,
            label_width,
        }
    }

    /// Builds one frame, starting with a carriage return.
    ///
    /// `columns` is the full terminal width. One column is kept free so the
    /// cursor never sits at the last column, which would wrap on some terminals.
    pub fn compose(&self, current: i64, total: i64, digits: usize, columns: usize) -> String {
        let mut available = columns.saturating_sub(1);

        let fraction = (current as f64 / total as f64).clamp(0.0, 1.0);
        let mut suffix = String::from(" ");
        if self.show_counter {
            let _ = write!(suffix, "{current:>digits$}/{total:>digits$} ");
        }
        let _ = write!(suffix, "{:5.1}%", fraction * 100.0);
        available = available.saturating_sub(suffix.len());

        let mut line = String::with_capacity(columns * 3 + 1);
        line.push('\r');
        if !self.label.is_empty() {
            line.push_str(&self.label);
            line.push(' ');
            available = available.saturating_sub(self.label_width + 1);
        }
        if let Some(delimiter) = self.delimiter {
            available = available.saturating_sub(2);
            line.push(delimiter);
            self.theme.render_into(&mut line, fraction, available);
            line.push(delimiter);
        } else {
            self.theme.render_into(&mut line, fraction, available);
        }
        line.push_str(&suffix);
        line
    }
}

/// Delimiter glyph for the current unicode support.
pub(crate) fn delimiter(unicode: bool) -> char {
    if unicode {
        '│'
    } else {
        '|'
    }
}
