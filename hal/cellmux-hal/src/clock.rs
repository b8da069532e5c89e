//! Time source

/// Monotonic millisecond clock
///
/// Used for debounce expiry and for re-arming periodic work from the
/// moment it completed.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}
