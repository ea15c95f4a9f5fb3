//! Property tests for the typing state machine.

use std::time::Duration;

use proptest::prelude::*;

use typewriter::typing::{PhraseList, Timeline, Timing, TypingState};

fn phrase() -> impl Strategy<Value = String> {
    // Mix ASCII and multi-byte characters; no separators or blanks.
    "[a-zA-Z0-9é日本語🦀 ]{0,10}[a-zA-Z0-9é日本語🦀]"
}

fn phrases() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(phrase(), 1..6)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn first_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

proptest! {
    #[test]
    fn one_cycle_advances_to_next_phrase(list in phrases()) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing::default();
        let mut state = TypingState::new();

        for _ in 0..2 * char_len(&list[0]) {
            state.tick(&phrases, &timing);
        }

        prop_assert_eq!(state.phrase_index(), 1 % list.len());
        prop_assert_eq!(state.char_index(), 0);
        prop_assert!(!state.is_deleting());
        prop_assert!(!state.is_paused());
    }

    #[test]
    fn typing_shows_prefixes(list in phrases()) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing::default();
        let mut state = TypingState::new();
        let len = char_len(&list[0]);

        for k in 1..=len {
            let tick = state.tick(&phrases, &timing);
            prop_assert_eq!(tick.text, first_chars(&list[0], k));
            let expected = if k == len { timing.hold } else { timing.type_delay };
            prop_assert_eq!(tick.delay, expected);
        }
        prop_assert!(state.is_paused());
    }

    #[test]
    fn deleting_shows_shrinking_prefixes(list in phrases()) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing::default();
        let mut state = TypingState::new();
        let len = char_len(&list[0]);

        for _ in 0..len {
            state.tick(&phrases, &timing);
        }
        for k in 1..=len {
            let tick = state.tick(&phrases, &timing);
            prop_assert_eq!(tick.text, first_chars(&list[0], len - k));
        }
    }

    #[test]
    fn full_loop_returns_to_start(list in phrases(), loops in 1usize..3) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing::default();
        let mut state = TypingState::new();
        let ticks_per_loop: usize = list.iter().map(|p| 2 * char_len(p)).sum();

        for _ in 0..ticks_per_loop * loops {
            state.tick(&phrases, &timing);
        }

        prop_assert_eq!(state.phrase_index(), 0);
        prop_assert_eq!(state.char_index(), 0);
        prop_assert_eq!(state.ticks(), (ticks_per_loop * loops) as u64);
    }

    #[test]
    fn timeline_loop_matches_cycle_durations(
        list in phrases(),
        type_ms in 1u64..200,
        delete_ms in 1u64..200,
        hold_ms in 0u64..2000,
        advance_ms in 0u64..1000,
    ) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing {
            type_delay: Duration::from_millis(type_ms),
            delete_delay: Duration::from_millis(delete_ms),
            hold: Duration::from_millis(hold_ms),
            advance_delay: Duration::from_millis(advance_ms),
        };
        let mut timeline = Timeline::new(phrases, timing);
        let expected = timeline.loop_duration();
        let ticks_per_loop: usize = list.iter().map(|p| 2 * char_len(p)).sum();

        timeline.take(ticks_per_loop);

        prop_assert_eq!(timeline.now(), expected);
        prop_assert_eq!(timeline.state().phrase_index(), 0);
    }

    #[test]
    fn rendered_text_is_always_a_phrase_prefix(list in phrases(), steps in 0usize..200) {
        let phrases = PhraseList::new(list.iter().map(String::as_str)).unwrap();
        let timing = Timing::default();
        let mut state = TypingState::new();

        for _ in 0..steps {
            let tick = state.tick(&phrases, &timing);
            prop_assert!(
                list.iter().any(|p| p.starts_with(tick.text.as_str())),
                "{:?} is not a prefix of any phrase", tick.text
            );
        }
    }
}

#[test]
fn go_rust_scenario() {
    let phrases = PhraseList::parse("Go|Rust").unwrap();
    let timing = Timing::default();
    let mut state = TypingState::new();

    let texts: Vec<String> = (0..13).map(|_| state.tick(&phrases, &timing).text).collect();
    assert_eq!(
        texts,
        ["G", "Go", "G", "", "R", "Ru", "Rus", "Rust", "Rus", "Ru", "R", "", "G"]
    );
}

#[test]
fn empty_phrases_without_defaults_never_start() {
    assert!(PhraseList::resolve(Some(""), &[]).is_none());
    assert!(PhraseList::resolve(Some(" | "), &[]).is_none());
    assert!(PhraseList::resolve(None, &[]).is_none());
}
