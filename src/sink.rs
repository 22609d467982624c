//! Operator-facing output shared by every inspection task.
//!
//! Pull progress, verbose lifecycle notes and cleanup warnings from concurrent tasks all
//! funnel through one mutex, so a line is always written whole and prefixed with the image
//! it belongs to. Nothing written here is part of the result data and write failures are
//! swallowed.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct OperatorSink {
    out: Mutex<Box<dyn Write + Send>>,
    use_color: bool,
    verbose: bool,
}

impl OperatorSink {
    /// Sink writing to stderr; progress and info lines only when `verbose`.
    pub fn stderr(use_color: bool, verbose: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(io::stderr())),
            use_color,
            verbose,
        }
    }

    /// Uncolored sink over an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static, verbose: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            use_color: false,
            verbose,
        }
    }

    /// In-memory sink; the returned handle reads back everything written so far.
    pub fn memory(verbose: bool) -> (Self, MemoryLog) {
        let log = MemoryLog::default();
        (Self::from_writer(log.clone(), verbose), log)
    }

    /// One line of pull progress (verbose only).
    pub fn progress(&self, image: &str, line: &str) {
        let line = line.trim();
        if !self.verbose || line.is_empty() {
            return;
        }
        self.write_line(&format!("[{image}] {line}"));
    }

    /// Lifecycle note (verbose only).
    pub fn info(&self, image: &str, msg: &str) {
        if !self.verbose {
            return;
        }
        let line = crate::paint(
            self.use_color,
            crate::color::CYAN_BOLD,
            &format!("[{image}] {msg}"),
        );
        self.write_line(&line);
    }

    /// Always shown; used for failures that must not change a result.
    pub fn warn(&self, image: &str, msg: &str) {
        let line = crate::paint(
            self.use_color,
            crate::color::YELLOW,
            &format!("[{image}] warning: {msg}"),
        );
        self.write_line(&line);
    }

    fn write_line(&self, line: &str) {
        let mut out = lock_ignoring_poison(&self.out);
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

// A panicking task must not silence every other task's output.
fn lock_ignoring_poison<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Shared byte buffer backing `OperatorSink::memory`.
#[derive(Clone, Default)]
pub struct MemoryLog {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryLog {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock_ignoring_poison(&self.buf)).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for MemoryLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        lock_ignoring_poison(&self.buf).extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
