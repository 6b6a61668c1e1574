//! Error types returned when constructing bars, themes and spinners.

use thiserror::Error;

/// Errors reported at construction time.
///
/// Nothing that happens while a bar is running is surfaced as an error:
/// probe failures fall back to defaults and write failures are logged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("progress total must be positive, got {total}")]
    InvalidTotal { total: i64 },

    #[error("a palette theme needs at least 2 glyphs, got {len}")]
    PaletteTooShort { len: usize },

    #[error("glyph {glyph:?} does not occupy exactly one terminal column")]
    WideGlyph { glyph: char },

    #[error("a spinner needs at least one frame")]
    NoFrames,

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
