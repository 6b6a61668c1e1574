//! The determinate progress bar and its background render thread.

use std::io::{self, Write};
use std::ops::Deref;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ansi_escapes::{CursorHide, CursorShow};
use crossbeam_channel::{bounded, select, tick, Receiver, SendError, Sender};
use parking_lot::Mutex;

use crate::error::Result;
use crate::layout::{self, Layout};
use crate::state::ProgressState;
use crate::term;
use crate::theme::Theme;

pub const FPS_10: Duration = Duration::from_millis(100);
pub const FPS_20: Duration = Duration::from_millis(50);
pub const FPS_30: Duration = Duration::from_millis(33);
pub const FPS_60: Duration = Duration::from_millis(16);

pub(crate) type Output = Box<dyn Write + Send>;

/// Options controlling how a [`Bar`] is drawn.
#[derive(Clone, Debug)]
pub struct Options {
    /// How long the render thread waits between redraws.
    /// Defaults to [`FPS_20`].
    pub tick_rate: Duration,
    /// Print `current/total` before the percentage.
    pub show_counter: bool,
    /// Enclose the bar body in `│` (or `|` without unicode).
    pub show_delimiters: bool,
    /// Glyph theme. Defaults to [`Theme::blocks`] matched to unicode support.
    pub theme: Option<Theme>,
    /// Fixed line width instead of probing the terminal on every frame.
    pub width: Option<usize>,
    /// Overrides the process-wide unicode probe.
    pub unicode: Option<bool>,
    /// Hide the cursor while the bar runs. Only applies when drawing to a terminal.
    pub hide_cursor: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tick_rate: FPS_20,
            show_counter: false,
            show_delimiters: false,
            theme: None,
            width: None,
            unicode: None,
            hide_cursor: true,
        }
    }
}

/// Where a bar is in its one-shot lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    /// Transient: `stop`/`abort` hold the bar while the render thread drains,
    /// so [`Bar::state`] never returns it.
    Stopping,
    Stopped,
    Aborted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shutdown {
    Stop,
    Abort,
}

struct Worker {
    shutdown: Sender<Shutdown>,
    handle: JoinHandle<()>,
}

struct Control {
    state: LifecycleState,
    renderer: Option<Renderer>,
    worker: Option<Worker>,
}

/// A single-line progress bar redrawn by a background thread.
///
/// Producers update the bar through the [`ProgressState`] it dereferences to,
/// from as many threads as they like. Only the render thread writes output.
///
/// ```no_run
/// use tickbar::Bar;
///
/// let bar = Bar::new("Copying", 100)?;
/// bar.start()?;
/// std::thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| bar.increment_by(25));
///     }
/// });
/// bar.stop();
/// assert!(bar.finished());
/// # Ok::<(), tickbar::Error>(())
/// ```
pub struct Bar {
    progress: Arc<ProgressState>,
    control: Mutex<Control>,
}

impl Bar {
    /// Creates a bar drawing to stdout with default options.
    pub fn new(label: impl Into<String>, total: i64) -> Result<Bar> {
        Self::with_options(label, total, Options::default())
    }

    /// Creates a bar drawing to stdout.
    pub fn with_options(label: impl Into<String>, total: i64, options: Options) -> Result<Bar> {
        let terminal = term::is_terminal();
        Self::build(label.into(), total, options, Box::new(io::stdout()), terminal)
    }

    /// Creates a bar drawing to an arbitrary writer.
    ///
    /// The writer is never treated as a terminal, so no cursor escapes are
    /// emitted; set [`Options::width`] to control the line width.
    pub fn with_writer<W>(
        label: impl Into<String>,
        total: i64,
        options: Options,
        writer: W,
    ) -> Result<Bar>
    where
        W: Write + Send + 'static,
    {
        Self::build(label.into(), total, options, Box::new(writer), false)
    }

    fn build(
        label: String,
        total: i64,
        options: Options,
        output: Output,
        terminal: bool,
    ) -> Result<Bar> {
        let progress = Arc::new(ProgressState::new(total)?);
        let unicode = options.unicode.unwrap_or_else(term::supports_unicode);
        let theme = options.theme.unwrap_or_else(|| Theme::blocks(unicode));
        let delimiter = options
            .show_delimiters
            .then(|| layout::delimiter(unicode));

        let renderer = Renderer {
            layout: Layout::new(label, options.show_counter, delimiter, theme),
            progress: progress.clone(),
            digits: progress.digits(),
            output,
            width: options.width,
            tick_rate: options.tick_rate,
            hide_cursor: options.hide_cursor && terminal,
        };
        Ok(Bar {
            progress,
            control: Mutex::new(Control {
                state: LifecycleState::Idle,
                renderer: Some(renderer),
                worker: None,
            }),
        })
    }

    /// Draws the first frame and starts the render thread.
    ///
    /// Does nothing unless the bar is idle; a finished bar cannot be restarted.
    /// If the thread cannot be spawned nothing is drawn and the bar stays idle.
    pub fn start(&self) -> Result<()> {
        self.start_with(|work| {
            thread::Builder::new()
                .name("tickbar-render".into())
                .spawn(work)
        })
    }

    fn start_with<F>(&self, spawn: F) -> Result<()>
    where
        F: FnOnce(Box<dyn FnOnce() + Send>) -> io::Result<JoinHandle<()>>,
    {
        let mut control = self.control.lock();
        if control.state != LifecycleState::Idle {
            return Ok(());
        }
        let Some(mut renderer) = control.renderer.take() else {
            return Ok(());
        };

        // The thread exists before anything is written, and receives the
        // renderer together with the value of the first frame.
        let (shutdown, signal) = bounded(1);
        let (hand_off, handed) = bounded::<(Renderer, i64)>(1);
        let work: Box<dyn FnOnce() + Send> = Box::new(move || {
            if let Ok((renderer, drawn)) = handed.recv() {
                renderer.run(signal, drawn);
            }
        });
        let handle = match spawn(work) {
            Ok(handle) => handle,
            Err(e) => {
                control.renderer = Some(renderer);
                tracing::warn!(error = %e, "failed to spawn progress render thread");
                return Err(e.into());
            }
        };

        let drawn = renderer.begin();
        if let Err(SendError((mut renderer, _))) = hand_off.send((renderer, drawn)) {
            renderer.finish();
        }
        control.worker = Some(Worker { shutdown, handle });
        control.state = LifecycleState::Running;
        tracing::debug!(total = self.progress.total(), "progress bar started");
        Ok(())
    }

    /// Completes the bar: draws a final 100% frame, ends the line and waits
    /// for the render thread to exit.
    ///
    /// Does nothing unless the bar is running.
    pub fn stop(&self) {
        self.shutdown(Shutdown::Stop);
    }

    /// Ends the bar where it is, without forcing a final 100% frame, and waits
    /// for the render thread to exit.
    ///
    /// Does nothing unless the bar is running.
    pub fn abort(&self) {
        self.shutdown(Shutdown::Abort);
    }

    fn shutdown(&self, how: Shutdown) {
        // The lock is held across the join so that a concurrent caller only
        // returns once the render thread is gone.
        let mut control = self.control.lock();
        if control.state != LifecycleState::Running {
            return;
        }
        control.state = LifecycleState::Stopping;

        if let Some(worker) = control.worker.take() {
            let _ = worker.shutdown.send(how);
            if worker.handle.join().is_err() {
                tracing::warn!("progress render thread panicked");
            }
        }

        control.state = match how {
            Shutdown::Stop => LifecycleState::Stopped,
            Shutdown::Abort => LifecycleState::Aborted,
        };
        tracing::debug!(
            state = ?control.state,
            current = self.progress.current(),
            "progress bar finished"
        );
    }

    pub fn state(&self) -> LifecycleState {
        self.control.lock().state
    }

    /// A handle to the counter that can be moved to other threads.
    pub fn progress(&self) -> Arc<ProgressState> {
        self.progress.clone()
    }
}

impl Deref for Bar {
    type Target = ProgressState;
    fn deref(&self) -> &Self::Target {
        &self.progress
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Everything the render thread owns.
struct Renderer {
    layout: Layout,
    progress: Arc<ProgressState>,
    digits: usize,
    output: Output,
    width: Option<usize>,
    tick_rate: Duration,
    hide_cursor: bool,
}

impl Renderer {
    /// Hides the cursor if asked to and draws the first frame.
    fn begin(&mut self) -> i64 {
        if self.hide_cursor {
            self.emit(&CursorHide.to_string());
        }
        self.draw()
    }

    fn run(mut self, signal: Receiver<Shutdown>, mut last: i64) {
        let ticker = tick(self.tick_rate);

        let how = loop {
            select! {
                recv(ticker) -> _ => {
                    if self.progress.current() != last {
                        last = self.draw();
                    }
                }
                recv(signal) -> msg => break msg.unwrap_or(Shutdown::Abort),
            }
        };

        match how {
            Shutdown::Stop => {
                self.progress.set(self.progress.total());
                self.draw();
            }
            Shutdown::Abort => {
                if self.progress.current() != last {
                    self.draw();
                }
            }
        }
        self.finish();
    }

    /// Ends the line and gives the cursor back.
    fn finish(&mut self) {
        let mut tail = String::from("\n");
        if self.hide_cursor {
            tail.push_str(&CursorShow.to_string());
        }
        self.emit(&tail);
    }

    /// Writes one frame and returns the value it shows.
    fn draw(&mut self) -> i64 {
        let current = self.progress.current();
        let columns = self.width.unwrap_or_else(term::column_width);
        let line = self
            .layout
            .compose(current, self.progress.total(), self.digits, columns);
        tracing::trace!(current, columns, "draw");
        self.emit(&line);
        current
    }

    fn emit(&mut self, text: &str) {
        let written = self
            .output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write progress output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn options() -> Options {
        Options {
            tick_rate: Duration::from_millis(5),
            width: Some(40),
            unicode: Some(false),
            ..Options::default()
        }
    }

    fn bar(total: i64) -> (Bar, Capture) {
        let capture = Capture::default();
        let bar = Bar::with_writer("test", total, options(), capture.clone()).unwrap();
        (bar, capture)
    }

    /// Bumps the counter from inside the first write, i.e. while the first
    /// frame is being drawn.
    struct IncrementOnFirstWrite {
        capture: Capture,
        progress: Arc<Mutex<Option<Arc<ProgressState>>>>,
    }

    impl Write for IncrementOnFirstWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(progress) = self.progress.lock().take() {
                progress.increment_by(4);
            }
            self.capture.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn wait_for(capture: &Capture, needle: &str) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !capture.text().contains(needle) {
            assert!(
                std::time::Instant::now() < deadline,
                "{needle:?} never drawn: {:?}",
                capture.text()
            );
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn construction_rejects_zero_total() {
        assert!(Bar::with_writer("x", 0, options(), Capture::default()).is_err());
    }

    #[test]
    fn start_draws_immediately() {
        let (bar, capture) = bar(10);
        assert_eq!(bar.state(), LifecycleState::Idle);
        assert_eq!(capture.text(), "");
        bar.start().unwrap();
        assert_eq!(bar.state(), LifecycleState::Running);
        assert!(capture.text().starts_with("\rtest "));
        assert!(capture.text().ends_with("  0.0%"));
        bar.abort();
    }

    #[test]
    fn stop_forces_completion() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        bar.increment_by(3);
        bar.stop();
        assert_eq!(bar.state(), LifecycleState::Stopped);
        assert!(bar.finished());
        let text = capture.text();
        assert!(text.ends_with("100.0%\n"), "{text:?}");
        assert_eq!(text.matches('\n').count(), 1);
    }

    #[test]
    fn abort_keeps_current() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        bar.abort();
        assert_eq!(bar.state(), LifecycleState::Aborted);
        assert_eq!(bar.current(), 0);
        let text = capture.text();
        assert!(!text.contains("100.0%"), "{text:?}");
        assert!(text.ends_with("\n"));
    }

    #[test]
    fn shutdown_before_start_is_a_no_op() {
        let (bar, capture) = bar(10);
        bar.stop();
        bar.abort();
        assert_eq!(bar.state(), LifecycleState::Idle);
        assert_eq!(capture.text(), "");
    }

    #[test]
    fn lifecycle_is_one_shot() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        bar.start().unwrap();
        bar.stop();
        let before = capture.text();
        bar.start().unwrap();
        bar.stop();
        bar.abort();
        assert_eq!(bar.state(), LifecycleState::Stopped);
        assert_eq!(capture.text(), before);
    }

    #[test]
    fn idle_ticks_do_not_redraw() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(capture.text().matches('\r').count(), 1);
        bar.abort();
    }

    #[test]
    fn changes_are_redrawn() {
        let (bar, capture) = bar(4);
        bar.start().unwrap();
        bar.increment_by(2);
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !capture.text().contains(" 50.0%") {
            assert!(std::time::Instant::now() < deadline, "frame never drawn");
            thread::sleep(Duration::from_millis(5));
        }
        bar.abort();
    }

    #[test]
    fn drop_joins_running_bar() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        drop(bar);
        assert!(capture.text().ends_with("\n"));
    }

    #[test]
    fn increment_during_first_frame_is_redrawn() {
        let capture = Capture::default();
        let slot = Arc::new(Mutex::new(None));
        let writer = IncrementOnFirstWrite {
            capture: capture.clone(),
            progress: slot.clone(),
        };
        let options = Options {
            show_counter: true,
            ..options()
        };
        let bar = Bar::with_writer("x", 10, options, writer).unwrap();
        *slot.lock() = Some(bar.progress());

        bar.start().unwrap();
        assert!(capture.text().contains(" 0/10"));
        assert_eq!(bar.current(), 4);
        wait_for(&capture, " 4/10");
        bar.abort();
    }

    #[test]
    fn failed_spawn_writes_nothing_and_stays_idle() {
        let capture = Capture::default();
        let bar = Bar::build(
            "t".into(),
            10,
            options(),
            Box::new(capture.clone()),
            true,
        )
        .unwrap();

        let failed = bar.start_with(|_| Err(io::Error::new(io::ErrorKind::Other, "no threads")));
        assert!(matches!(failed, Err(crate::Error::Spawn(_))));
        assert_eq!(bar.state(), LifecycleState::Idle);
        assert_eq!(capture.text(), "");

        bar.start().unwrap();
        bar.stop();
        let text = capture.text();
        assert!(text.starts_with(&CursorHide.to_string()), "{text:?}");
        assert!(text.ends_with(&format!("\n{}", CursorShow)), "{text:?}");
    }

    #[test]
    fn writer_never_gets_cursor_escapes() {
        let (bar, capture) = bar(10);
        bar.start().unwrap();
        bar.stop();
        assert!(!capture.text().contains('\u{1b}'));
    }
}
