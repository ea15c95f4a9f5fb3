//! Display targets.
//!
//! A display target is anything whose visible text the typing engine can
//! replace: a terminal line, a file read by a status bar, or an in-memory
//! buffer. Each engine owns exactly one target.

pub mod file;
pub mod memory;
pub mod terminal;

pub use file::FileDisplay;
pub use memory::MemoryDisplay;
pub use terminal::{TerminalDisplay, TerminalStream};

use crate::config::schema::OutputTarget;
use crate::error::RenderError;

/// A render target whose text can be replaced wholesale.
#[async_trait::async_trait]
pub trait DisplayTarget: Send {
    /// Replaces the displayed text with `text`.
    async fn render(&mut self, text: &str) -> Result<(), RenderError>;

    /// Called once after the engine stops. Defaults to a no-op.
    async fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Name used in logs, events and metrics labels.
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl DisplayTarget for Box<dyn DisplayTarget> {
    async fn render(&mut self, text: &str) -> Result<(), RenderError> {
        (**self).render(text).await
    }

    async fn finish(&mut self) -> Result<(), RenderError> {
        (**self).finish().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Static text surrounding the animated phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    /// Text shown before the phrase.
    pub prefix: String,
    /// Glyph shown after the phrase, e.g. `_` or `|`.
    pub cursor: String,
}

impl Decoration {
    /// Wraps `text` in the prefix and cursor.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + text.len() + self.cursor.len());
        out.push_str(&self.prefix);
        out.push_str(text);
        out.push_str(&self.cursor);
        out
    }
}

/// Opens the display target described by `output`.
#[must_use]
pub fn open(name: &str, output: &OutputTarget, decoration: Decoration) -> Box<dyn DisplayTarget> {
    match output {
        OutputTarget::Stdout => Box::new(TerminalDisplay::new(
            name,
            TerminalStream::Stdout,
            decoration,
        )),
        OutputTarget::Stderr => Box::new(TerminalDisplay::new(
            name,
            TerminalStream::Stderr,
            decoration,
        )),
        OutputTarget::File(path) => Box::new(FileDisplay::new(name, path.clone(), decoration)),
    }
}
