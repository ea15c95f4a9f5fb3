//! Typing state machine.
//!
//! [`TypingState`] is the clock-free core of the engine: each call to
//! [`TypingState::tick`] advances the machine by exactly one step, returns
//! the text to display and the delay before the next step. Scheduling is
//! left to the caller (a tokio task, or the simulated [`Timeline`]).
//!
//! ```text
//!   Typing ──(charIndex == len)──▶ PausedAtFull
//!     ▲                                 │ hold elapses
//!     │                                 ▼
//!   AdvancingPause ◀──(charIndex == 0)── Deleting
//! ```
//!
//! [`Timeline`]: super::timeline::Timeline

use std::time::Duration;

use super::phrases::PhraseList;
use super::timing::Timing;

/// Where the machine is while waiting for its next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Adding one character per tick.
    Typing,
    /// Full phrase shown; the next tick starts deleting.
    PausedAtFull,
    /// Removing one character per tick.
    Deleting,
    /// Phrase fully deleted and index advanced; the next tick types.
    AdvancingPause,
}

impl Stage {
    /// Lowercase name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::PausedAtFull => "paused_at_full",
            Self::Deleting => "deleting",
            Self::AdvancingPause => "advancing_pause",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milestone reached by a tick, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// The phrase at `phrase_index` is now fully displayed.
    PhraseCompleted {
        /// Index of the completed phrase.
        phrase_index: usize,
    },
    /// The display is empty and the engine moved to the next phrase.
    PhraseAdvanced {
        /// Phrase that was just deleted.
        from: usize,
        /// Phrase that will be typed next.
        to: usize,
    },
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// Text the display target must show after this tick.
    pub text: String,
    /// Delay before the next tick.
    pub delay: Duration,
    /// Stage the machine is in until the next tick.
    pub stage: Stage,
    /// Milestone reached by this tick.
    pub milestone: Option<Milestone>,
}

/// Mutable state of one typing engine.
///
/// Invariants: `phrase_index < phrases.len()` and
/// `char_index <= phrases.char_len(phrase_index)` for the list the state
/// is ticked with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingState {
    phrase_index: usize,
    char_index: usize,
    is_deleting: bool,
    is_paused: bool,
    ticks: u64,
}

impl TypingState {
    /// Initial state: typing phrase 0 from an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the phrase currently being typed or deleted.
    #[must_use]
    pub const fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    /// Number of characters currently displayed.
    #[must_use]
    pub const fn char_index(&self) -> usize {
        self.char_index
    }

    /// Whether the machine is deleting.
    #[must_use]
    pub const fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    /// Whether the full phrase is on hold.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Ticks performed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current stage, derived from the flags.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        if self.is_paused {
            Stage::PausedAtFull
        } else if self.is_deleting {
            Stage::Deleting
        } else if self.char_index == 0 && self.ticks > 0 {
            Stage::AdvancingPause
        } else {
            Stage::Typing
        }
    }

    /// Advances the machine by one step.
    ///
    /// Every tick produces exactly one text to render and exactly one
    /// delay; the caller must not tick again before that delay elapses.
    pub fn tick(&mut self, phrases: &PhraseList, timing: &Timing) -> Tick {
        // Guard against a state reused with a shorter list.
        self.phrase_index %= phrases.len();
        let len = phrases.char_len(self.phrase_index);
        self.ticks = self.ticks.saturating_add(1);

        if self.is_paused {
            self.is_paused = false;
            self.is_deleting = true;
        }

        let mut milestone = None;
        let delay = if self.is_deleting {
            self.char_index = self.char_index.min(len).saturating_sub(1);
            if self.char_index == 0 {
                let from = self.phrase_index;
                self.is_deleting = false;
                self.phrase_index = (self.phrase_index + 1) % phrases.len();
                milestone = Some(Milestone::PhraseAdvanced {
                    from,
                    to: self.phrase_index,
                });
                timing.advance_delay
            } else {
                timing.delete_delay
            }
        } else {
            self.char_index = (self.char_index + 1).min(len);
            if self.char_index == len {
                self.is_paused = true;
                milestone = Some(Milestone::PhraseCompleted {
                    phrase_index: self.phrase_index,
                });
                timing.hold
            } else {
                timing.type_delay
            }
        };

        // After an advance the text belongs to the phrase just deleted,
        // which is empty at char_index 0 either way.
        let text = phrases.prefix(self.phrase_index, self.char_index).to_owned();

        Tick {
            text,
            delay,
            stage: self.stage(),
            milestone,
        }
    }
}
