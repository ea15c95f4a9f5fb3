//! Pacing for the typing engine.

use std::time::Duration;

/// Delay between typing ticks.
pub const DEFAULT_TYPE_DELAY: Duration = Duration::from_millis(100);

/// Delay between deleting ticks. Deleting runs at twice the typing speed.
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_millis(50);

/// How long a fully typed phrase stays on screen before deletion starts.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(1500);

/// Pause after a phrase is fully deleted, before the next one starts.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(500);

/// The four delays that drive the engine's cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay after each typed character.
    pub type_delay: Duration,
    /// Delay after each deleted character.
    pub delete_delay: Duration,
    /// Hold time once the phrase is fully typed.
    pub hold: Duration,
    /// Gap between a fully deleted phrase and the next one.
    pub advance_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            type_delay: DEFAULT_TYPE_DELAY,
            delete_delay: DEFAULT_DELETE_DELAY,
            hold: DEFAULT_HOLD,
            advance_delay: DEFAULT_ADVANCE_DELAY,
        }
    }
}

impl Timing {
    /// Total time one phrase of `chars` characters occupies, from its first
    /// typed character to the first character of the next phrase.
    #[must_use]
    pub fn cycle_duration(&self, chars: usize) -> Duration {
        let chars = u32::try_from(chars).unwrap_or(u32::MAX);
        if chars == 0 {
            // One empty render, the hold, one empty delete tick, the gap.
            return self.hold + self.advance_delay;
        }
        self.type_delay * (chars - 1)
            + self.hold
            + self.delete_delay * (chars - 1)
            + self.advance_delay
    }
}
