//! Typing effect engine
//!
//! Cycles through a list of phrases, typing each one character by
//! character into a display target, holding it, deleting it, and moving
//! on to the next phrase, forever.
//!
//! # Architecture
//!
//! - [`PhraseList`]: non-empty phrase sequence, parsed from `"a|b|c"`
//! - [`Timing`]: type, delete, hold and advance delays
//! - [`TypingState`]: the pure state machine, one step per tick
//! - [`TypingEngine`]: state + display target, run as a tokio task
//! - [`Timeline`]: synchronous simulated clock over the state machine

pub mod engine;
pub mod phrases;
pub mod state;
pub mod timeline;
pub mod timing;

pub use engine::{EngineHandle, EngineReport, StopReason, TypingEngine};
pub use phrases::{DEFAULT_PHRASES, PhraseList};
pub use state::{Milestone, Stage, Tick, TypingState};
pub use timeline::{Frame, Timeline};
pub use timing::Timing;
