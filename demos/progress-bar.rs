use std::thread;
use std::time::Duration;

use tickbar::{supports_unicode, Bar, Options, Theme};
use tracing_subscriber::EnvFilter;

fn main() -> tickbar::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let unicode = supports_unicode();
    let themes = [
        ("Blocks ", Theme::blocks(unicode)),
        ("Braille", Theme::braille(unicode)),
        ("Dots   ", Theme::dots(unicode)),
        ("Pixels ", Theme::pixels(unicode)),
        ("Shades ", Theme::shades(unicode)),
        ("Arrow  ", Theme::ascii_bar()),
    ];

    for (label, theme) in themes {
        let options = Options {
            theme: Some(theme),
            show_counter: true,
            show_delimiters: true,
            ..Options::default()
        };
        let bar = Bar::with_options(label, 500, options)?;
        bar.start()?;

        // Bar can be shared with worker threads:
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    while !bar.finished() {
                        thread::sleep(Duration::from_millis(10));
                        bar.increment();
                    }
                });
            }
        });

        bar.stop();
    }
    Ok(())
}
