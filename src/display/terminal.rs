//! Single-line terminal display.
//!
//! Each render returns the cursor to column 0, clears the line and writes
//! the decorated text, so the animation stays on one line.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Decoration, DisplayTarget};
use crate::error::RenderError;

/// ANSI sequence: carriage return, then erase the entire line.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Standard stream a terminal display writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStream {
    /// Process stdout.
    Stdout,
    /// Process stderr.
    Stderr,
}

/// Display target that rewrites one terminal line.
pub struct TerminalDisplay {
    name: String,
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    decoration: Decoration,
}

impl std::fmt::Debug for TerminalDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDisplay")
            .field("name", &self.name)
            .field("decoration", &self.decoration)
            .finish_non_exhaustive()
    }
}

impl TerminalDisplay {
    /// Creates a display bound to a standard stream.
    #[must_use]
    pub fn new(name: impl Into<String>, stream: TerminalStream, decoration: Decoration) -> Self {
        let writer: Box<dyn AsyncWrite + Send + Unpin> = match stream {
            TerminalStream::Stdout => Box::new(tokio::io::stdout()),
            TerminalStream::Stderr => Box::new(tokio::io::stderr()),
        };
        Self::with_writer(name, writer, decoration)
    }

    /// Creates a display writing to an arbitrary async writer.
    #[must_use]
    pub fn with_writer(
        name: impl Into<String>,
        writer: Box<dyn AsyncWrite + Send + Unpin>,
        decoration: Decoration,
    ) -> Self {
        Self {
            name: name.into(),
            writer,
            decoration,
        }
    }

    fn io_error(&self, source: std::io::Error) -> RenderError {
        if source.kind() == std::io::ErrorKind::BrokenPipe {
            RenderError::Closed(self.name.clone())
        } else {
            RenderError::Io {
                target: self.name.clone(),
                source,
            }
        }
    }
}

#[async_trait::async_trait]
impl DisplayTarget for TerminalDisplay {
    async fn render(&mut self, text: &str) -> Result<(), RenderError> {
        let line = format!("{CLEAR_LINE}{}", self.decoration.apply(text));
        if let Err(e) = self.writer.write_all(line.as_bytes()).await {
            return Err(self.io_error(e));
        }
        if let Err(e) = self.writer.flush().await {
            return Err(self.io_error(e));
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), RenderError> {
        // Leave the last frame visible and move off the animated line.
        if let Err(e) = self.writer.write_all(b"\n").await {
            return Err(self.io_error(e));
        }
        if let Err(e) = self.writer.flush().await {
            return Err(self.io_error(e));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
