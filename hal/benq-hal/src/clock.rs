//! Monotonic clock abstraction
//!
//! Time is a free-running 32-bit millisecond counter that wraps after about
//! 49.7 days. Elapsed time must always be computed by wrapping subtraction
//! (`now.wrapping_sub(since)`), never by comparing absolute values.

/// Milliseconds since an arbitrary epoch (typically boot)
pub type Millis = u32;

/// Source of the current time
pub trait Clock {
    /// Current value of the millisecond counter
    fn now_ms(&self) -> Millis;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> Millis {
        T::now_ms(self)
    }
}
