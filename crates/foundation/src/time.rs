/// Millisecond timestamp on the viewer's monotonic clock.
///
/// The core never reads a clock itself; hosts pass `now` in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub fn after(self, delay_ms: u64) -> TimeMs {
        TimeMs(self.0.saturating_add(delay_ms))
    }

    /// Milliseconds elapsed since `earlier`, zero if the clock went backwards.
    pub fn since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
