//! Keep track of time, both in native and web platforms!
pub use web_time::Duration;
pub use web_time::Instant;

/// A duration long enough to mean "wait until something happens".
pub const FOREVER: Duration = Duration::MAX;

/// Returns the deadline `delay` after `start`.
///
/// Returns `None` when it cannot be represented, as with [`FOREVER`].
pub fn deadline(start: Instant, delay: Duration) -> Option<Instant> {
    start.checked_add(delay)
}
