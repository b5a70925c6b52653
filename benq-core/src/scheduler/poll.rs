//! Status polling
//!
//! Every poll interval the engine enqueues one round of queries. When the
//! projector is off only the power state is useful; the full set is queried
//! once it reports on. Polling is skipped while the send queue already holds
//! more than one interval's worth of commands, so a slow link never builds an
//! unbounded backlog of stale queries.

use heapless::Vec;

use benq_protocol::keys;

use crate::state::DeviceState;
use crate::time::{reached, Millis};

/// Largest number of queries one poll round can produce
pub const MAX_POLL_QUERIES: usize = 9;

/// Keys queried in one poll round
pub type PollQueries = Vec<&'static str, MAX_POLL_QUERIES>;

/// Decides when a poll round is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollScheduler {
    interval_ms: u32,
    max_backlog: usize,
    next_poll: Millis,
}

impl PollScheduler {
    /// Create a scheduler that polls immediately
    ///
    /// The backlog limit is the number of commands the link can send in one
    /// poll interval.
    pub fn new(poll_interval_ms: u32, send_interval_ms: u32, now: Millis) -> Self {
        let max_backlog = (poll_interval_ms / send_interval_ms.max(1)).max(1) as usize;
        Self {
            interval_ms: poll_interval_ms,
            max_backlog,
            next_poll: now,
        }
    }

    /// Queue depth above which polling is skipped
    pub fn max_backlog(&self) -> usize {
        self.max_backlog
    }

    /// Time the next poll round is due
    pub fn next_poll(&self) -> Millis {
        self.next_poll
    }

    /// Make the next round due at `now`
    pub fn force(&mut self, now: Millis) {
        self.next_poll = now;
    }

    /// Check whether a round should run now
    ///
    /// Returns true at most once per interval. A round that is due but
    /// blocked by the backlog stays due.
    pub fn due(&mut self, now: Millis, backlog: usize) -> bool {
        if !reached(now, self.next_poll) || backlog > self.max_backlog {
            return false;
        }
        self.next_poll = now.wrapping_add(self.interval_ms);
        true
    }
}

/// Queries for one poll round given the last known device state
pub fn poll_queries(state: &DeviceState) -> PollQueries {
    let mut queries = PollQueries::new();
    let on = state.power().is_on();

    // Capacity covers every key below
    let _ = queries.push(keys::POWER);
    if on {
        for key in [
            keys::SOURCE,
            keys::VOLUME,
            keys::MUTE,
            keys::LAMP_MODE,
            keys::BLANK,
            keys::FREEZE,
        ] {
            let _ = queries.push(key);
        }
        if !state.model_name_known() {
            let _ = queries.push(keys::MODEL_NAME);
        }
    }
    if on || state.lamp_hours() == 0 {
        let _ = queries.push(keys::LAMP_HOURS);
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polls_immediately() {
        let mut poll = PollScheduler::new(1_000, 100, 0);
        assert!(poll.due(0, 0));
        assert!(!poll.due(500, 0));
        assert!(poll.due(1_000, 0));
    }

    #[test]
    fn test_backlog_skips_round() {
        let mut poll = PollScheduler::new(1_000, 100, 0);
        assert_eq!(poll.max_backlog(), 10);
        assert!(!poll.due(0, 11));
        // Still due once the queue drains
        assert!(poll.due(300, 10));
        assert_eq!(poll.next_poll(), 1_300);
    }

    #[test]
    fn test_backlog_at_least_one() {
        let poll = PollScheduler::new(50, 100, 0);
        assert_eq!(poll.max_backlog(), 1);
    }

    #[test]
    fn test_force() {
        let mut poll = PollScheduler::new(1_000, 100, 0);
        assert!(poll.due(0, 0));
        poll.force(200);
        assert!(poll.due(200, 0));
    }

    #[test]
    fn test_queries_when_unknown() {
        let state = DeviceState::new();
        let queries = poll_queries(&state);
        assert_eq!(queries.as_slice(), &[keys::POWER, keys::LAMP_HOURS]);
    }

    #[test]
    fn test_queries_when_on() {
        let mut state = DeviceState::new();
        state.apply(keys::POWER, "on", 0, 0).unwrap();
        let queries = poll_queries(&state);
        assert_eq!(queries.len(), MAX_POLL_QUERIES);
        assert_eq!(queries[0], keys::POWER);
        assert!(queries.contains(&keys::MODEL_NAME));
        assert!(queries.contains(&keys::LAMP_HOURS));

        state.apply(keys::MODEL_NAME, "W1070", 0, 0).unwrap();
        assert!(!poll_queries(&state).contains(&keys::MODEL_NAME));
    }

    #[test]
    fn test_queries_when_off_with_known_hours() {
        let mut state = DeviceState::new();
        state.apply(keys::POWER, "off", 0, 0).unwrap();
        state.apply(keys::LAMP_HOURS, "1200", 0, 0).unwrap();
        assert_eq!(poll_queries(&state).as_slice(), &[keys::POWER]);
    }
}
