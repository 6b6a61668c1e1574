//! Terminal capability probing: column width and unicode safety.

use std::sync::OnceLock;

use atty::Stream;
use terminal_size::{terminal_size, Width};

/// Width assumed when stdout is not a terminal or the size query fails.
pub const FALLBACK_WIDTH: usize = 80;

static UNICODE: OnceLock<bool> = OnceLock::new();

/// A snapshot of what the attached terminal can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub column_width: usize,
    pub unicode_supported: bool,
}

impl TerminalCapabilities {
    /// Probes the current process environment, bypassing the unicode cache.
    pub fn probe() -> TerminalCapabilities {
        let caps = Self::probe_with(|key| std::env::var(key).ok(), column_width());
        tracing::debug!(
            column_width = caps.column_width,
            unicode = caps.unicode_supported,
            "probed terminal"
        );
        caps
    }

    /// Builds capabilities from an arbitrary environment lookup.
    pub fn probe_with<F>(env: F, column_width: usize) -> TerminalCapabilities
    where
        F: Fn(&str) -> Option<String>,
    {
        TerminalCapabilities {
            column_width,
            unicode_supported: unicode_from_env(env),
        }
    }
}

/// Returns true when stdout is attached to a terminal.
pub fn is_terminal() -> bool {
    atty::is(Stream::Stdout)
}

/// Current column count of the terminal behind stdout, or [`FALLBACK_WIDTH`].
pub fn column_width() -> usize {
    if !is_terminal() {
        return FALLBACK_WIDTH;
    }
    match terminal_size() {
        Some((Width(w), _)) if w > 0 => w as usize,
        _ => FALLBACK_WIDTH,
    }
}

/// Whether multi-byte glyphs are safe to print.
///
/// Computed once per process from the locale and terminal type.
pub fn supports_unicode() -> bool {
    *UNICODE.get_or_init(|| {
        let supported = unicode_from_env(|key| std::env::var(key).ok());
        tracing::debug!(supported, "unicode support probed");
        supported
    })
}

fn unicode_from_env<F>(env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let utf8 = |value: String| {
        let value = value.to_lowercase();
        value.contains("utf-8") || value.contains("utf8")
    };
    if ["LANG", "LC_ALL", "LC_CTYPE"]
        .into_iter()
        .filter_map(|key| env(key))
        .any(utf8)
    {
        return true;
    }
    match env("TERM") {
        Some(term) => term == "xterm" || term == "xterm-256color" || term.starts_with("screen"),
        None => false,
    }
}
