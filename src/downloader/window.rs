//! Time range partitioning into fixed-size download windows
//!
//! A [`TimeRange`] is split into consecutive [`Window`]s of at most one
//! interval each. Windows are end-exclusive, contiguous and never overlap:
//! the end of one window is the start of the next, and the last window ends
//! exactly at the range end (it may be shorter than the interval).
//!
//! # Usage Example
//!
//! ```rust
//! use cloudflare_logs_downloader::downloader::window::{Alignment, TimeRange, Window, Windows};
//!
//! let range = TimeRange::new(0, 150).unwrap();
//! let windows: Vec<Window> = Windows::new(range, 60, Alignment::Exact).collect();
//!
//! assert_eq!(
//!     windows,
//!     vec![Window::new(0, 60), Window::new(60, 120), Window::new(120, 150)]
//! );
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat};

/// Global download range `[start, end)` in Unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: i64,
    end: i64,
}

impl TimeRange {
    /// Create a range, rejecting negative bounds and empty ranges
    pub fn new(start: i64, end: i64) -> Result<Self, String> {
        if start < 0 {
            return Err(format!("start ({start}) is < 0"));
        }
        if end <= start {
            return Err(format!("end ({end}) is not after start ({start})"));
        }
        Ok(Self { start, end })
    }

    /// Inclusive start in Unix seconds
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive end in Unix seconds
    pub fn end(&self) -> i64 {
        self.end
    }
}

/// One download window `[start, end)` in Unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// Start time (inclusive)
    pub start: i64,
    /// End time (exclusive)
    pub end: i64,
}

impl Window {
    /// Create a window
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window length in seconds
    pub fn len_secs(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for Window {
    /// Formats as `"<start> to <end>"` with RFC 3339 UTC timestamps
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_utc(self.start), format_utc(self.end))
    }
}

fn format_utc(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => timestamp.to_string(),
    }
}

/// Where the first window starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// First window starts exactly at the range start
    #[default]
    Exact,
    /// First window starts at the range start truncated down to a multiple
    /// of the interval, so no window crosses an interval boundary
    Interval,
}

/// Iterator over the windows of a range
#[derive(Debug, Clone)]
pub struct Windows {
    next_start: i64,
    end: i64,
    interval: i64,
}

impl Windows {
    /// Partition `range` into windows of `interval_secs`
    ///
    /// `interval_secs` must be positive; non-positive values are clamped to
    /// one second so the iterator always terminates.
    pub fn new(range: TimeRange, interval_secs: i64, alignment: Alignment) -> Self {
        let interval = interval_secs.max(1);
        let first = match alignment {
            Alignment::Exact => range.start,
            Alignment::Interval => range.start - range.start.rem_euclid(interval),
        };

        Self {
            next_start: first,
            end: range.end,
            interval,
        }
    }

    /// Number of windows still to be produced
    pub fn remaining(&self) -> u64 {
        if self.next_start >= self.end {
            return 0;
        }
        let span = self.end - self.next_start;
        ((span - 1) / self.interval + 1) as u64
    }
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next_start >= self.end {
            return None;
        }

        let start = self.next_start;
        let end = start.saturating_add(self.interval).min(self.end);
        self.next_start = end;

        Some(Window { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}
