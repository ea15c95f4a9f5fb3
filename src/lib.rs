//! `typewriter` - looping typewriter effect for terminals and files
//!
//! Types a phrase character by character, holds it, deletes it and moves
//! on to the next one, forever, on any number of independent display
//! targets.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod observability;
pub mod typing;
