//! Rolling send/receive counters
//!
//! Each direction keeps a running total plus, per window, the count and rate
//! of the last completed window. Windows restart independently once their
//! duration has passed.

use crate::time::{elapsed, Millis};

/// Statistics windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Window {
    TenSeconds,
    OneMinute,
    SixMinutes,
}

/// All windows, in index order
pub const WINDOWS: [Window; 3] = [Window::TenSeconds, Window::OneMinute, Window::SixMinutes];

impl Window {
    /// Window length in milliseconds
    pub const fn duration_ms(&self) -> u32 {
        match self {
            Window::TenSeconds => 10_000,
            Window::OneMinute => 60_000,
            Window::SixMinutes => 360_000,
        }
    }

    const fn index(&self) -> usize {
        match self {
            Window::TenSeconds => 0,
            Window::OneMinute => 1,
            Window::SixMinutes => 2,
        }
    }
}

/// Count and rate of the last completed window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowStats {
    /// Messages counted in the window
    pub count: u32,
    /// Messages per second over the window
    pub rate: f32,
}

/// Snapshot of one direction's counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirectionStats {
    /// Messages since startup
    pub total: u64,
    /// Last completed window, indexed like [`WINDOWS`]
    pub windows: [WindowStats; 3],
}

impl DirectionStats {
    /// Stats for one window
    pub fn window(&self, window: Window) -> WindowStats {
        self.windows[window.index()]
    }
}

#[derive(Debug, Clone, Default)]
struct Counter {
    total: u64,
    current: [u32; 3],
    last: [WindowStats; 3],
}

impl Counter {
    fn record(&mut self) {
        self.total += 1;
        for count in self.current.iter_mut() {
            *count = count.saturating_add(1);
        }
    }

    fn rotate(&mut self, index: usize, elapsed_ms: u32) {
        let count = self.current[index];
        let rate = if elapsed_ms == 0 {
            0.0
        } else {
            1000.0 * count as f32 / elapsed_ms as f32
        };
        self.last[index] = WindowStats { count, rate };
        self.current[index] = 0;
    }

    fn snapshot(&self) -> DirectionStats {
        DirectionStats {
            total: self.total,
            windows: self.last,
        }
    }
}

/// Send and receive throughput bookkeeping
#[derive(Debug, Clone)]
pub struct Throughput {
    sent: Counter,
    received: Counter,
    /// Start of each window currently being counted
    window_started: [Millis; 3],
}

impl Throughput {
    /// Start counting at `now`
    pub fn new(now: Millis) -> Self {
        Self {
            sent: Counter::default(),
            received: Counter::default(),
            window_started: [now; 3],
        }
    }

    /// Restart all windows at `now`, keeping totals
    pub fn restart_windows(&mut self, now: Millis) {
        self.window_started = [now; 3];
    }

    /// Count one sent message
    pub fn record_sent(&mut self) {
        self.sent.record();
    }

    /// Count one received message
    pub fn record_received(&mut self) {
        self.received.record();
    }

    /// Close any windows whose duration has passed
    pub fn tick(&mut self, now: Millis) {
        for window in WINDOWS {
            let index = window.index();
            let elapsed_ms = elapsed(now, self.window_started[index]);
            if elapsed_ms > window.duration_ms() {
                self.sent.rotate(index, elapsed_ms);
                self.received.rotate(index, elapsed_ms);
                self.window_started[index] = now;
            }
        }
    }

    /// Sent message statistics
    pub fn sent(&self) -> DirectionStats {
        self.sent.snapshot()
    }

    /// Received message statistics
    pub fn received(&self) -> DirectionStats {
        self.received.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_count_immediately() {
        let mut stats = Throughput::new(0);
        stats.record_sent();
        stats.record_sent();
        stats.record_received();
        assert_eq!(stats.sent().total, 2);
        assert_eq!(stats.received().total, 1);
        // No window has closed yet
        assert_eq!(stats.sent().window(Window::TenSeconds).count, 0);
    }

    #[test]
    fn test_ten_second_window_rotates() {
        let mut stats = Throughput::new(0);
        for _ in 0..20 {
            stats.record_sent();
        }

        stats.tick(10_000);
        assert_eq!(stats.sent().window(Window::TenSeconds).count, 0);

        stats.tick(10_001);
        let ten = stats.sent().window(Window::TenSeconds);
        assert_eq!(ten.count, 20);
        assert!((ten.rate - 2.0).abs() < 0.01);

        // Longer windows are still open
        assert_eq!(stats.sent().window(Window::OneMinute).count, 0);
    }

    #[test]
    fn test_windows_reset_independently() {
        let mut stats = Throughput::new(0);
        stats.record_received();
        stats.tick(10_001);
        stats.record_received();
        stats.tick(60_001);

        assert_eq!(stats.received().window(Window::TenSeconds).count, 1);
        assert_eq!(stats.received().window(Window::OneMinute).count, 2);
        assert_eq!(stats.received().window(Window::SixMinutes).count, 0);
        assert_eq!(stats.received().total, 2);
    }

    #[test]
    fn test_window_across_clock_wrap() {
        let start = u32::MAX - 5_000;
        let mut stats = Throughput::new(start);
        stats.record_sent();
        stats.tick(start.wrapping_add(10_001));
        assert_eq!(stats.sent().window(Window::TenSeconds).count, 1);
    }
}
