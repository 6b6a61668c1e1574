use std::thread;
use std::time::Duration;

use tickbar::Spinner;
use tracing_subscriber::EnvFilter;

fn main() -> tickbar::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let spinner = Spinner::new();
    spinner.start()?;
    thread::sleep(Duration::from_millis(1500));

    spinner.pause();
    thread::sleep(Duration::from_millis(750));
    spinner.resume();

    thread::sleep(Duration::from_millis(1500));
    spinner.stop();
    println!();
    Ok(())
}
