//! Simulated clock for the typing state machine.
//!
//! [`Timeline`] drives a [`TypingState`] synchronously, stamping each tick
//! with the virtual time at which a real engine would have rendered it.
//! Nothing sleeps, so previews and tests are deterministic and instant.

use std::time::Duration;

use serde::Serialize;

use super::phrases::PhraseList;
use super::state::{Stage, TypingState};
use super::timing::Timing;

/// One rendered frame on the virtual clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Virtual time of the render, measured from the first tick.
    #[serde(serialize_with = "serialize_millis", rename = "at_ms")]
    pub at: Duration,
    /// Text shown from this frame on.
    pub text: String,
    /// Phrase the state machine is working on after the tick.
    pub phrase_index: usize,
    /// Stage until the next frame.
    #[serde(serialize_with = "serialize_stage")]
    pub stage: Stage,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_stage<S: serde::Serializer>(stage: &Stage, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(stage.as_str())
}

/// Deterministic driver for a typing state machine.
#[derive(Debug, Clone)]
pub struct Timeline {
    phrases: PhraseList,
    timing: Timing,
    state: TypingState,
    now: Duration,
}

impl Timeline {
    /// Creates a timeline at virtual time zero.
    #[must_use]
    pub fn new(phrases: PhraseList, timing: Timing) -> Self {
        Self {
            phrases,
            timing,
            state: TypingState::new(),
            now: Duration::ZERO,
        }
    }

    /// Virtual time of the next frame.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Underlying state machine.
    #[must_use]
    pub const fn state(&self) -> &TypingState {
        &self.state
    }

    /// Produces the next frame and advances the clock by its delay.
    pub fn next_frame(&mut self) -> Frame {
        let tick = self.state.tick(&self.phrases, &self.timing);
        let frame = Frame {
            at: self.now,
            text: tick.text,
            phrase_index: self.state.phrase_index(),
            stage: tick.stage,
        };
        self.now += tick.delay;
        frame
    }

    /// Produces the next `n` frames.
    pub fn take(&mut self, n: usize) -> Vec<Frame> {
        (0..n).map(|_| self.next_frame()).collect()
    }

    /// Produces every frame rendered before `window` elapses on the
    /// virtual clock, counted from the current time.
    pub fn run_for(&mut self, window: Duration) -> Vec<Frame> {
        let end = self.now + window;
        let mut frames = Vec::new();
        while self.now < end {
            frames.push(self.next_frame());
        }
        frames
    }

    /// Time one full type-pause-delete-advance cycle of the phrase at
    /// `phrase_index` takes.
    #[must_use]
    pub fn cycle_duration(&self, phrase_index: usize) -> Duration {
        self.timing
            .cycle_duration(self.phrases.char_len(phrase_index))
    }

    /// Time it takes to cycle through every phrase once.
    #[must_use]
    pub fn loop_duration(&self) -> Duration {
        (0..self.phrases.len())
            .map(|i| self.cycle_duration(i))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(attr: &str) -> Timeline {
        Timeline::new(PhraseList::parse(attr).unwrap(), Timing::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_frames_are_stamped_with_virtual_time() {
        let mut tl = timeline("Go|Rust");
        let frames = tl.take(5);
        let stamps: Vec<(Duration, &str)> =
            frames.iter().map(|f| (f.at, f.text.as_str())).collect();
        assert_eq!(
            stamps,
            vec![
                (ms(0), "G"),
                (ms(100), "Go"),
                (ms(1600), "G"),
                (ms(1650), ""),
                (ms(2150), "R"),
            ]
        );
    }

    #[test]
    fn test_run_for_stops_at_window() {
        let mut tl = timeline("Go|Rust");
        let frames = tl.run_for(ms(1600));
        assert_eq!(frames.len(), 2);
        assert_eq!(tl.now(), ms(1600));

        // The window is relative to the current time.
        let next = tl.run_for(ms(51));
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].text, "");
    }

    #[test]
    fn test_cycle_duration_matches_frames() {
        let mut tl = timeline("Go|Rust");
        let cycle = tl.cycle_duration(0);
        tl.run_for(cycle);
        assert_eq!(tl.now(), cycle);
        assert_eq!(tl.state().phrase_index(), 1);
        assert_eq!(tl.state().char_index(), 0);
    }

    #[test]
    fn test_loop_duration_returns_to_start() {
        let mut tl = timeline("Go|Rust|Zig");
        let full_loop = tl.loop_duration();
        tl.run_for(full_loop);
        assert_eq!(tl.now(), full_loop);
        assert_eq!(tl.state().phrase_index(), 0);
        assert_eq!(tl.next_frame().text, "G");
    }

    #[test]
    fn test_frame_serializes_millis_and_stage() {
        let mut tl = timeline("Go");
        tl.next_frame();
        let frame = tl.next_frame();
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["at_ms"], 100);
        assert_eq!(json["text"], "Go");
        assert_eq!(json["stage"], "paused_at_full");
        assert_eq!(json["phrase_index"], 0);
    }
}
