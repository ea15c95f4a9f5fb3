//! Shared helpers for integration tests that drive the built binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Runs the `typewriter` binary built for this test target.
pub struct TypewriterProcess;

impl TypewriterProcess {
    /// Path to the compiled binary.
    pub fn binary() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_typewriter"))
    }

    /// Base command with a clean environment for the variables we read.
    pub fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(Self::binary());
        cmd.args(args)
            .env_remove("TYPEWRITER_CONFIG")
            .env_remove("TYPEWRITER_LOG_LEVEL")
            .env_remove("TYPEWRITER_EVENTS_FILE")
            .env_remove("TYPEWRITER_METRICS_PORT")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Runs a command to completion and returns its output.
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .output()
            .expect("failed to run typewriter binary")
    }

    /// Path to a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }
}
