//! Plain-text console reporter.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use substup_core::Reporter;

/// Reporter that prints progress to stderr, honoring `--quiet`.
#[derive(Debug)]
pub struct ConsoleReporter {
    quiet: bool,
    progress_active: AtomicBool,
}

impl ConsoleReporter {
    /// Create a reporter; `quiet` suppresses everything but warnings.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            progress_active: AtomicBool::new(false),
        }
    }

    /// Terminate an in-flight progress line before printing a full line.
    fn end_progress_line(&self) {
        if self.progress_active.swap(false, Ordering::Relaxed) {
            eprintln!();
        }
    }

    fn line(&self, msg: &str) {
        if !self.quiet {
            self.end_progress_line();
            eprintln!("{msg}");
        }
    }
}

impl Reporter for ConsoleReporter {
    fn downloading(&self, received: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        self.progress_active.store(true, Ordering::Relaxed);
        match total {
            Some(total) if total > 0 => {
                let percent = (received as f64 / total as f64 * 100.0) as u8;
                eprint!(
                    "\rdownloading {} / {} ({percent}%)   ",
                    format_bytes(received),
                    format_bytes(total)
                );
            }
            _ => eprint!("\rdownloading {}   ", format_bytes(received)),
        }
        let _ = std::io::stderr().flush();
    }

    fn extracting(&self, filename: &str) {
        self.line(&format!("extracting {filename}"));
    }

    fn installing(&self, binary: &str, version: &str) {
        self.line(&format!("installing {binary} v{version}"));
    }

    fn removing(&self, binary: &str) {
        self.line(&format!("removing {binary}"));
    }

    fn done(&self, detail: &str) {
        self.line(detail);
    }

    fn failed(&self, reason: &str) {
        // Failures print even under --quiet.
        self.end_progress_line();
        eprintln!("error: {reason}");
    }

    fn info(&self, msg: &str) {
        self.line(msg);
    }

    fn warning(&self, msg: &str) {
        // Warnings print even under --quiet.
        self.end_progress_line();
        eprintln!("warning: {msg}");
    }
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
