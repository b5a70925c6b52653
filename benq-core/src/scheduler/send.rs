//! Rate-limited send slot

use crate::time::{elapsed, reached, Millis};

/// Paces outbound commands to at most one per interval
///
/// The next slot advances from the previous slot rather than from the actual
/// send time, so a tick loop that samples late does not accumulate drift. A
/// send that is a whole interval or more behind resynchronizes to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SendScheduler {
    interval_ms: u32,
    next_send: Millis,
}

impl SendScheduler {
    /// Create a scheduler whose first slot is open at `now`
    pub fn new(interval_ms: u32, now: Millis) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_send: now,
        }
    }

    /// Send interval in milliseconds
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Time the next send becomes allowed
    pub fn next_send(&self) -> Millis {
        self.next_send
    }

    /// Open the send slot at `now`
    pub fn reset(&mut self, now: Millis) {
        self.next_send = now;
    }

    /// True if a command may be written at `now`
    pub fn is_ready(&self, now: Millis) -> bool {
        reached(now, self.next_send)
    }

    /// Record that a command was written at `now`
    pub fn mark_sent(&mut self, now: Millis) {
        let slot = if elapsed(now, self.next_send) >= self.interval_ms {
            now
        } else {
            self.next_send
        };
        self.next_send = slot.wrapping_add(self.interval_ms);
    }
}
