//! Wraparound-safe millisecond arithmetic
//!
//! The clock is a free-running `u32` that wraps. Every comparison goes through
//! wrapping subtraction, so a deadline compares correctly as long as it lies
//! within half the counter range (about 24.8 days) of the current time.

pub use benq_hal::Millis;

/// Half the counter range; differences at or beyond this are "in the past"
const HALF_RANGE: u32 = 1 << 31;

/// Milliseconds elapsed from `since` to `now`
pub fn elapsed(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// True once `now` is at or past `deadline`
pub fn reached(now: Millis, deadline: Millis) -> bool {
    now.wrapping_sub(deadline) < HALF_RANGE
}

/// The deadline that comes first
pub fn earliest(a: Millis, b: Millis) -> Millis {
    if b.wrapping_sub(a) < HALF_RANGE {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
        assert_eq!(elapsed(1000, 400), 600);
    }

    #[test]
    fn test_reached() {
        assert!(reached(100, 100));
        assert!(reached(101, 100));
        assert!(!reached(99, 100));
    }

    #[test]
    fn test_reached_across_wrap() {
        let deadline = u32::MAX - 10;
        assert!(!reached(u32::MAX - 20, deadline));
        assert!(reached(u32::MAX - 10, deadline));
        // Counter wrapped past the deadline
        assert!(reached(15, deadline));
    }

    #[test]
    fn test_earliest() {
        assert_eq!(earliest(100, 200), 100);
        assert_eq!(earliest(200, 100), 100);
        assert_eq!(earliest(u32::MAX - 5, 10), u32::MAX - 5);
    }
}
