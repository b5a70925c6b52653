//! Send and poll timing
//!
//! The send scheduler paces outbound commands to one per send interval. The
//! poll scheduler decides when to enqueue a fresh round of status queries and
//! which queries that round contains.

pub mod poll;
pub mod send;

pub use poll::{poll_queries, PollQueries, PollScheduler, MAX_POLL_QUERIES};
pub use send::SendScheduler;
