//! In-memory display that records every frame.

use std::sync::{Arc, Mutex};

use super::DisplayTarget;
use crate::error::RenderError;

/// Display target that records each rendered text.
///
/// Clones share the same buffer, so a test can keep one clone and hand
/// the other to an engine.
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    name: String,
    frames: Arc<Mutex<Vec<String>>>,
}

impl MemoryDisplay {
    /// Creates an empty recording display.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every text rendered so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// The currently displayed text, or `None` before the first render.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }

    /// Number of renders so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.frames.lock().map_or(0, |f| f.len())
    }
}

#[async_trait::async_trait]
impl DisplayTarget for MemoryDisplay {
    async fn render(&mut self, text: &str) -> Result<(), RenderError> {
        self.frames
            .lock()
            .map_err(|_| RenderError::Closed(self.name.clone()))?
            .push(text.to_owned());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
