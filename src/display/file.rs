//! File display.
//!
//! Replaces a file's contents on every render. Text is written to a
//! sibling temp file and renamed over the target, so a reader (a status
//! bar polling the file, say) never sees a half-written frame.

use std::path::{Path, PathBuf};

use super::{Decoration, DisplayTarget};
use crate::error::RenderError;

/// Display target backed by a file on disk.
#[derive(Debug)]
pub struct FileDisplay {
    name: String,
    path: PathBuf,
    staging: PathBuf,
    decoration: Decoration,
}

impl FileDisplay {
    /// Creates a display that writes to `path`.
    ///
    /// Nothing touches the filesystem until the first render.
    #[must_use]
    pub fn new(name: impl Into<String>, path: PathBuf, decoration: Decoration) -> Self {
        let staging = staging_path(&path);
        Self {
            name: name.into(),
            path,
            staging,
            decoration,
        }
    }

    /// Path of the file being rewritten.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RenderError {
        RenderError::Io {
            target: self.name.clone(),
            source,
        }
    }
}

/// `dir/status.txt` → `dir/.status.txt.typewriter-tmp`
fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "display".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{file_name}.typewriter-tmp"))
}

#[async_trait::async_trait]
impl DisplayTarget for FileDisplay {
    async fn render(&mut self, text: &str) -> Result<(), RenderError> {
        let mut contents = self.decoration.apply(text);
        contents.push('\n');

        if let Err(e) = tokio::fs::write(&self.staging, contents.as_bytes()).await {
            return Err(self.io_error(e));
        }
        if let Err(e) = tokio::fs::rename(&self.staging, &self.path).await {
            return Err(self.io_error(e));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staging = staging_path(Path::new("/tmp/bar/status.txt"));
        assert_eq!(staging, PathBuf::from("/tmp/bar/.status.txt.typewriter-tmp"));
    }

    #[tokio::test]
    async fn test_render_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.txt");
        let mut display = FileDisplay::new(
            "hero",
            path.clone(),
            Decoration {
                prefix: String::new(),
                cursor: "|".to_string(),
            },
        );

        display.render("Ru").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Ru|\n");

        display.render("Rust").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Rust|\n");

        // The staging file never lingers after a successful render.
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("hero.txt");
        let mut display = FileDisplay::new("hero", path, Decoration::default());

        let err = display.render("G").await.unwrap_err();
        assert!(matches!(err, RenderError::Io { ref target, .. } if target == "hero"));
    }
}
