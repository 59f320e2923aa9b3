//! The transcript delta capture loop.
//!
//! Runs for the lifetime of one recognition call. On a fixed period it
//! drains the shared [`TranscriptBuffer`], strips the timestamp prefix off
//! every complete line, appends the resulting delta to the live transcript
//! file, and hands non-empty deltas to the dispatcher for synthesis and
//! playback, blocking until playback ends. Dispatch blocking the loop is
//! the backpressure mechanism: while one delta is being spoken, the next
//! simply accumulates more lines in the buffer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::defaults;
use crate::dispatch::Dispatcher;
use crate::error::{RespeakError, Result};
use crate::playback::AudioPlayer;
use crate::report::{ErrorReporter, LogReporter};
use crate::transcript::buffer::TranscriptBuffer;
use crate::transcript::line::TranscriptLine;
use crate::tts::synthesizer::SpeechBackend;

/// How often a sleeping worker re-checks the stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Counters accumulated by the capture worker and returned on stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Drain cycles run, including empty ones and the final flush.
    pub cycles: u64,
    /// Deltas successfully synthesized and played.
    pub deltas_dispatched: u64,
    /// Characters appended to the live transcript file.
    pub chars_captured: u64,
    /// Cycle errors reported (persist, dispatch, or buffer access).
    pub errors: u64,
}

/// Extract the delta from a drained snapshot.
///
/// Each complete line loses its timestamp prefix; the remaining texts are
/// joined with single spaces, in line order. Lines with an empty payload
/// contribute nothing.
pub fn assemble_delta(snapshot: &str) -> String {
    let mut delta = String::new();
    for line in snapshot.lines() {
        let text = TranscriptLine::parse(line).text;
        if text.is_empty() {
            continue;
        }
        if !delta.is_empty() {
            delta.push(' ');
        }
        delta.push_str(text);
    }
    delta
}

/// Append one delta record to the live transcript.
///
/// The delta and its trailing newline go out in a single write. Split
/// writes can tear, and a torn append plus a requeued snapshot duplicates
/// text in the transcript file.
fn append_record(out: &mut impl Write, delta: &str) -> std::io::Result<()> {
    let mut record = String::with_capacity(delta.len() + 1);
    record.push_str(delta);
    record.push('\n');
    out.write_all(record.as_bytes())
}

/// Periodic drain-and-dispatch worker over a shared transcript buffer.
pub struct CaptureLoop<B: SpeechBackend, P: AudioPlayer> {
    buffer: Arc<TranscriptBuffer>,
    transcript_path: PathBuf,
    dispatcher: Dispatcher<B, P>,
    poll_period: Duration,
    reporter: Arc<dyn ErrorReporter>,
}

impl<B: SpeechBackend + 'static, P: AudioPlayer + 'static> CaptureLoop<B, P> {
    pub fn new(
        buffer: Arc<TranscriptBuffer>,
        transcript_path: PathBuf,
        dispatcher: Dispatcher<B, P>,
    ) -> Self {
        Self {
            buffer,
            transcript_path,
            dispatcher,
            poll_period: Duration::from_secs(defaults::POLL_PERIOD_SECS),
            reporter: Arc::new(LogReporter),
        }
    }

    /// Override the drain period.
    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Truncate the live transcript file and start the capture worker.
    ///
    /// A zero poll period is rejected: the drain sleep is what keeps the
    /// worker from spinning between cycles.
    pub fn start(self) -> Result<CaptureHandle> {
        if self.poll_period.is_zero() {
            return Err(RespeakError::Capture {
                message: "poll period must be greater than zero".to_string(),
            });
        }

        // Fresh file per run; cycles append from here on.
        std::fs::File::create(&self.transcript_path)?;

        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);
        let (stats_tx, stats_rx) = crossbeam_channel::bounded(1);

        let thread = thread::spawn(move || {
            let stats = self.run(&worker_running);
            let _ = stats_tx.send(stats);
        });

        Ok(CaptureHandle {
            running,
            thread: Some(thread),
            stats_rx,
        })
    }

    fn run(self, running: &AtomicBool) -> CaptureStats {
        let mut stats = CaptureStats::default();
        while running.load(Ordering::SeqCst) {
            self.cycle(&mut stats);

            let mut slept = Duration::ZERO;
            while slept < self.poll_period && running.load(Ordering::SeqCst) {
                let step = STOP_POLL_INTERVAL.min(self.poll_period - slept);
                thread::sleep(step);
                slept += step;
            }
        }
        // Final flush for lines written after the last periodic drain.
        self.cycle(&mut stats);
        stats
    }

    /// One drain cycle: snapshot, parse, persist, dispatch.
    ///
    /// Failures are reported and counted but never abort the loop. A failed
    /// persist re-queues the snapshot so the transcript file stays complete
    /// once writes succeed again; a failed dispatch is not replayed, since
    /// the delta is already persisted.
    fn cycle(&self, stats: &mut CaptureStats) {
        stats.cycles += 1;

        let snapshot = match self.buffer.drain() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.reporter.report("capture", &e);
                stats.errors += 1;
                return;
            }
        };
        if snapshot.is_empty() {
            return;
        }

        let delta = assemble_delta(&snapshot);
        if delta.is_empty() {
            return;
        }

        if let Err(e) = self.persist(&delta) {
            self.reporter.report("persist", &e);
            stats.errors += 1;
            if let Err(e) = self.buffer.requeue(&snapshot) {
                self.reporter.report("persist", &e);
                stats.errors += 1;
            }
            return;
        }
        stats.chars_captured += delta.chars().count() as u64;

        match self.dispatcher.dispatch(&delta) {
            Ok(()) => stats.deltas_dispatched += 1,
            Err(e) => {
                self.reporter.report("dispatch", &e);
                stats.errors += 1;
            }
        }
    }

    fn persist(&self, delta: &str) -> Result<()> {
        // Open-append-close every cycle; nothing holds the file between drains.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.transcript_path)?;
        append_record(&mut file, delta)?;
        Ok(())
    }
}

/// Owner-side handle to a running capture worker.
pub struct CaptureHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    stats_rx: Receiver<CaptureStats>,
}

impl CaptureHandle {
    /// Signal the worker to stop, wait for its final flush, and return the
    /// run's counters.
    ///
    /// Blocks until the worker finishes its in-flight cycle and the flush
    /// drain. A worker that panicked surfaces here as an error.
    pub fn stop(mut self) -> Result<CaptureStats> {
        self.running.store(false, Ordering::SeqCst);

        // A panicking worker drops its sender, so this never blocks forever.
        let stats = self.stats_rx.recv();

        if let Some(handle) = self.thread.take()
            && let Err(panic_info) = handle.join()
        {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            return Err(RespeakError::Capture {
                message: format!("capture thread panicked: {msg}"),
            });
        }

        stats.map_err(|_| RespeakError::Capture {
            message: "capture thread exited without reporting".to_string(),
        })
    }

    /// Returns true until `stop` is called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
