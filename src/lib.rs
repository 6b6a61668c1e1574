//! # tickbar
//!
//! This crate draws a single, continuously refreshed progress line in a terminal:
//! either a determinate progress bar or an indeterminate spinner.
//!
//! Progress updates can come from any number of threads and may be made with a very
//! high frequency. A [`Bar`] decouples the update rate from the redraw rate by
//! drawing from a background thread on a fixed tick, and only when the counter
//! changed. Producers never touch the terminal; they only bump an atomic counter.
//!
//! Every frame starts with a carriage return and overwrites the previous one.
//! A newline is written only when the bar is stopped or aborted.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tickbar::{Bar, Options, Theme};
//!
//! let options = Options {
//!     theme: Some(Theme::ascii_bar()),
//!     show_counter: true,
//!     tick_rate: Duration::from_millis(10),
//!     ..Options::default()
//! };
//! let bar = Bar::with_options("Downloading", 500, options)?;   // nothing shown yet
//! bar.start()?;                                                 // shows 0.0%
//! std::thread::scope(|s| {
//!     for _ in 0..5 {
//!         s.spawn(|| {
//!             for _ in 0..100 {
//!                 bar.increment();
//!             }
//!         });
//!     }
//! });
//! bar.stop();                                                   // shows 100.0% and ends the line
//! assert!(bar.finished());
//! # Ok::<(), tickbar::Error>(())
//! ```
//!
//! ## Themes
//!
//! A [`Theme`] either interpolates the boundary column through a gradient of
//! glyphs ([`Theme::palette`], [`Theme::blocks`], [`Theme::braille`], ...) or marks
//! it with a single tip glyph ([`Theme::tip`], [`Theme::ascii_bar`]). The built-in
//! gradients fall back to ASCII when [`term::supports_unicode`] says so.

pub mod bar;
pub mod error;
mod layout;
pub mod spinner;
pub mod state;
pub mod term;
pub mod theme;

pub use bar::{Bar, LifecycleState, Options, FPS_10, FPS_20, FPS_30, FPS_60};
pub use error::{Error, Result};
pub use spinner::{Spinner, SpinnerOptions, LOADING_FRAMES};
pub use state::ProgressState;
pub use term::{supports_unicode, TerminalCapabilities};
pub use theme::Theme;
