#![no_main]

use libfuzzer_sys::fuzz_target;
use typewriter::typing::{PhraseList, Timing, TypingState};

fuzz_target!(|data: &[u8]| {
    let Ok(attribute) = std::str::from_utf8(data) else {
        return;
    };
    let Some(phrases) = PhraseList::parse(attribute) else {
        return;
    };

    let timing = Timing::default();
    let mut state = TypingState::new();
    for _ in 0..512 {
        let tick = state.tick(&phrases, &timing);
        assert!(phrases.iter().any(|p| p.starts_with(tick.text.as_str())));
    }
});
