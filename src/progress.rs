use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clap::ValueEnum;
use crossbeam::channel::{RecvTimeoutError, Sender};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// How much transfer information to print to stderr.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum StatusLevel {
    /// Print nothing.
    None,
    /// Print a single summary once the copy finishes.
    Xfer,
    /// Update a progress line every second while the copy runs, plus the final summary.
    Progress,
}

/// Periodic reporter of how a copy is going. Purely observational - it only ever
/// reads the shared byte counter, so it can't affect the copy's correctness, and
/// it never blocks the copying threads.
pub struct Progress {
    level: StatusLevel,
    bytes_written: Arc<AtomicU64>,
    started: Instant,
    bar: Option<ProgressBar>,
    /// Dropped to tell the ticker thread to stop.
    stop_tx: Option<Sender<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl Progress {
    /// Starts reporting. In `Progress` mode this draws an immediate snapshot and then
    /// refreshes it from a background thread once a second; the other modes do nothing
    /// until `end`.
    pub fn begin(level: StatusLevel, bytes_written: Arc<AtomicU64>) -> Progress {
        let started = Instant::now();
        let (bar, stop_tx, ticker) = match level {
            StatusLevel::Progress => {
                // A message-only bar: the whole display is the stats line, redrawn in place.
                let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
                    .with_style(ProgressStyle::with_template("{wide_msg}").unwrap());
                bar.set_message(summary_line(0, started.elapsed()));

                let (stop_tx, stop_rx) = crossbeam::channel::bounded::<()>(1);
                let weak_bar = bar.downgrade();
                let bytes_written = bytes_written.clone();
                let ticker = thread::Builder::new()
                    .name("progress".to_string())
                    .spawn(move || loop {
                        match stop_rx.recv_timeout(Duration::from_secs(1)) {
                            Err(RecvTimeoutError::Timeout) => {}
                            _ => break, // Told to stop
                        }
                        // If the main thread has dropped the bar, stop updating it
                        let bar = match weak_bar.upgrade() {
                            Some(b) => b,
                            None => break,
                        };
                        if bar.is_finished() {
                            break;
                        }
                        bar.set_message(summary_line(
                            bytes_written.load(Ordering::Relaxed),
                            started.elapsed(),
                        ));
                    })
                    .expect("Failed to spawn thread");

                (Some(bar), Some(stop_tx), Some(ticker))
            }
            _ => (None, None, None),
        };

        Progress { level, bytes_written, started, bar, stop_tx, ticker }
    }

    /// Stops any periodic reporting and prints the final summary (unless reporting is
    /// off entirely). The ticker thread is joined first so that no periodic redraw can
    /// race with the final line.
    pub fn end(self) {
        drop(self.stop_tx);
        if let Some(ticker) = self.ticker {
            ticker.join().expect("Failed to join thread");
        }
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
        if self.level != StatusLevel::None {
            eprintln!(
                "{}",
                summary_line(self.bytes_written.load(Ordering::Relaxed), self.started.elapsed())
            );
        }
    }
}

/// Formats one stats line, e.g.
/// `123456789 bytes (123.457 MB, 117.738 MiB) copied, 2.000 s, 61.728 MB/s`.
fn summary_line(bytes: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let mb = bytes as f64 / 1_000_000.0;
    let mib = bytes as f64 / (1024.0 * 1024.0);
    let rate = if secs > 0.0 { mb / secs } else { 0.0 };
    format!("{bytes} bytes ({mb:.3} MB, {mib:.3} MiB) copied, {secs:.3} s, {rate:.3} MB/s")
}
