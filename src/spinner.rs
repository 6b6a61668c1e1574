//! An indeterminate spinner cycling through glyphs on a fixed tick.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;

use crate::bar::Output;
use crate::error::{Error, Result};

/// The classic `|/-\` cycle.
pub const LOADING_FRAMES: &str = "|/-\\";

/// Options controlling how a [`Spinner`] is drawn.
#[derive(Clone, Debug)]
pub struct SpinnerOptions {
    /// Time between frames. Defaults to 150 ms.
    pub tick_rate: Duration,
    /// Glyphs to cycle through, one frame per char.
    pub frames: Vec<char>,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        SpinnerOptions {
            tick_rate: Duration::from_millis(150),
            frames: LOADING_FRAMES.chars().collect(),
        }
    }
}

struct State {
    frame: AtomicUsize,
    paused: AtomicBool,
}

struct Worker {
    shutdown: Sender<()>,
    handle: JoinHandle<Output>,
}

enum Slot {
    Idle(Output),
    Running(Worker),
}

/// A spinner drawn by a background thread.
///
/// Unlike [`Bar`](crate::Bar) it can be started again after [`Spinner::stop`].
pub struct Spinner {
    state: Arc<State>,
    frames: Arc<[char]>,
    tick_rate: Duration,
    slot: Mutex<Option<Slot>>,
}

impl Spinner {
    /// Creates a spinner drawing to stdout.
    pub fn new() -> Spinner {
        Self::from_parts(SpinnerOptions::default(), Box::new(io::stdout()))
    }

    pub fn with_options(options: SpinnerOptions) -> Result<Spinner> {
        Self::build(options, Box::new(io::stdout()))
    }

    pub fn with_writer<W>(options: SpinnerOptions, writer: W) -> Result<Spinner>
    where
        W: Write + Send + 'static,
    {
        Self::build(options, Box::new(writer))
    }

    fn build(options: SpinnerOptions, output: Output) -> Result<Spinner> {
        if options.frames.is_empty() {
            return Err(Error::NoFrames);
        }
        Ok(Self::from_parts(options, output))
    }

    fn from_parts(options: SpinnerOptions, output: Output) -> Spinner {
        Spinner {
            state: Arc::new(State {
                frame: AtomicUsize::new(0),
                paused: AtomicBool::new(false),
            }),
            frames: options.frames.into(),
            tick_rate: options.tick_rate,
            slot: Mutex::new(Some(Slot::Idle(output))),
        }
    }

    /// Starts the render thread. Does nothing if already running.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.slot.lock();
        let output = match slot.take() {
            Some(Slot::Idle(output)) => output,
            other => {
                *slot = other;
                return Ok(());
            }
        };

        let (shutdown, signal) = bounded(1);
        let state = self.state.clone();
        let frames = self.frames.clone();
        let tick_rate = self.tick_rate;
        let spawned = thread::Builder::new()
            .name("tickbar-spinner".into())
            .spawn(move || spin(output, state, frames, tick_rate, signal));
        match spawned {
            Ok(handle) => {
                *slot = Some(Slot::Running(Worker { shutdown, handle }));
                tracing::debug!("spinner started");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stops the render thread and waits for it to exit. No final frame is drawn.
    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        let worker = match slot.take() {
            Some(Slot::Running(worker)) => worker,
            other => {
                *slot = other;
                return;
            }
        };
        let _ = worker.shutdown.send(());
        match worker.handle.join() {
            Ok(output) => *slot = Some(Slot::Idle(output)),
            Err(_) => tracing::warn!("spinner render thread panicked"),
        }
        tracing::debug!("spinner stopped");
    }

    /// Freezes the current frame. The render thread keeps ticking.
    pub fn pause(&self) {
        self.state.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.state.paused.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.slot.lock(), Some(Slot::Running(_)))
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Spinner::new()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spin(
    mut output: Output,
    state: Arc<State>,
    frames: Arc<[char]>,
    tick_rate: Duration,
    signal: Receiver<()>,
) -> Output {
    let ticker = tick(tick_rate);
    let mut line = String::with_capacity(8);
    loop {
        select! {
            recv(ticker) -> _ => {
                if state.paused.load(Ordering::Acquire) {
                    continue;
                }
                let frame = (state.frame.load(Ordering::Relaxed) + 1) % frames.len();
                state.frame.store(frame, Ordering::Relaxed);

                line.clear();
                line.push(frames[frame]);
                line.push('\r');
                let written = output
                    .write_all(line.as_bytes())
                    .and_then(|()| output.flush());
                if let Err(e) = written {
                    tracing::warn!(error = %e, "failed to write spinner frame");
                }
            }
            recv(signal) -> _ => break,
        }
    }
    output
}
