//! Diagnostics sink
//!
//! The scheduler reports what it armed, skipped and overrode through
//! [`Diagnostics::record`]. Recording is fire-and-forget: sinks drop what
//! they cannot keep and never report failures back.

use core::fmt::{self, Write};

use heapless::{Deque, String};

/// Fire-and-forget diagnostics collaborator
pub trait Diagnostics {
    fn record(&mut self, message: fmt::Arguments<'_>);
}

/// Discards everything
impl Diagnostics for () {
    fn record(&mut self, _message: fmt::Arguments<'_>) {}
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn record(&mut self, message: fmt::Arguments<'_>) {
        (**self).record(message);
    }
}

/// Prints every record on the ESP serial console
#[cfg(feature = "esp32-log")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialDiagnostics;

#[cfg(feature = "esp32-log")]
impl Diagnostics for SerialDiagnostics {
    fn record(&mut self, message: fmt::Arguments<'_>) {
        esp_println::println!("{}", message);
    }
}

/// In-memory log keeping the newest `LINES` records of up to `WIDTH` bytes
#[derive(Debug, Default)]
pub struct DiagnosticsLog<const LINES: usize, const WIDTH: usize> {
    lines: Deque<String<WIDTH>, LINES>,
    dropped: usize,
}

impl<const LINES: usize, const WIDTH: usize> DiagnosticsLog<LINES, WIDTH> {
    pub const fn new() -> Self {
        Self {
            lines: Deque::new(),
            dropped: 0,
        }
    }

    /// Recorded lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Most recent line
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Check if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines evicted to make room since the last rotation
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Clear the log, leaving a single rotation marker
    pub fn rotate(&mut self) {
        self.lines.clear();
        self.dropped = 0;
        self.record(format_args!("Rotated log"));
    }
}

impl<const LINES: usize, const WIDTH: usize> Diagnostics for DiagnosticsLog<LINES, WIDTH> {
    fn record(&mut self, message: fmt::Arguments<'_>) {
        if LINES == 0 {
            return;
        }
        let mut line = Truncating(String::new());
        // Truncating never fails
        let _ = line.write_fmt(message);

        if self.lines.is_full() {
            self.lines.pop_front();
            self.dropped += 1;
        }
        let _ = self.lines.push_back(line.0);
    }
}

/// Writer that silently cuts the text at capacity, on a char boundary
struct Truncating<const WIDTH: usize>(String<WIDTH>);

impl<const WIDTH: usize> Write for Truncating<WIDTH> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
