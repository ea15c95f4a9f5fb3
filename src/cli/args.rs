//! CLI argument definitions
//!
//! All Clap derive structs for `typewriter` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::schema::OutputTarget;

// ============================================================================
// Root CLI
// ============================================================================

/// Terminal and file typewriter effect: types, holds and deletes phrases
/// in a loop.
#[derive(Parser, Debug)]
#[command(name = "typewriter", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "TYPEWRITER_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Animate every configured display until interrupted.
    Run(RunArgs),

    /// Print the frames a run would render, without waiting.
    Preview(PreviewArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Phrase Source
// ============================================================================

/// Where the displays and phrases come from. Without either flag a single
/// stdout display cycles the built-in phrases.
#[derive(Args, Debug, Clone, Default)]
#[group(id = "source", multiple = false)]
pub struct SourceArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "TYPEWRITER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pipe-delimited phrases for a single display, e.g. "Go|Rust|Zig".
    #[arg(short, long)]
    pub phrases: Option<String>,
}

// ============================================================================
// Run / Preview
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Display source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Static text shown before the phrase (single-display mode).
    #[arg(long, conflicts_with = "config")]
    pub prefix: Option<String>,

    /// Cursor glyph shown after the phrase (single-display mode).
    #[arg(long, conflicts_with = "config")]
    pub cursor: Option<String>,

    /// Output target: stdout, stderr or a file path (single-display mode).
    #[arg(short, long, conflicts_with = "config")]
    pub output: Option<OutputTarget>,

    /// Stop after this long (e.g. "10s", "1m 30s").
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Write the JSONL event stream to this file.
    #[arg(long, env = "TYPEWRITER_EVENTS_FILE")]
    pub events: Option<PathBuf>,

    /// Expose Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "TYPEWRITER_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Display source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Virtual time window to simulate.
    #[arg(short, long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Validate
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap_or_else(|e| panic!("failed to parse {args:?}: {e}"))
    }

    fn run_args(cli: Cli) -> RunArgs {
        match cli.command {
            Commands::Run(args) => args,
            other => panic!("Expected RunArgs, got {other:?}"),
        }
    }

    #[test]
    fn test_run_without_source() {
        let args = run_args(parse(&["typewriter", "run"]));
        assert!(args.source.config.is_none());
        assert!(args.source.phrases.is_none());
        assert!(args.duration.is_none());
    }

    #[test]
    fn test_run_with_phrases_and_decoration() {
        let args = run_args(parse(&[
            "typewriter",
            "run",
            "--phrases",
            "Go|Rust",
            "--prefix",
            "We build ",
            "--cursor",
            "_",
            "--output",
            "stderr",
            "--duration",
            "1s 500ms",
        ]));
        assert_eq!(args.source.phrases.as_deref(), Some("Go|Rust"));
        assert_eq!(args.prefix.as_deref(), Some("We build "));
        assert_eq!(args.output, Some(OutputTarget::Stderr));
        assert_eq!(args.duration, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_output_file_path() {
        let args = run_args(parse(&["typewriter", "run", "-o", "status.txt"]));
        assert_eq!(args.output, Some(OutputTarget::File("status.txt".into())));
    }

    #[test]
    fn test_config_and_phrases_mutually_exclusive() {
        let cli = Cli::try_parse_from([
            "typewriter",
            "run",
            "--config",
            "c.yaml",
            "--phrases",
            "Go|Rust",
        ]);
        assert!(cli.is_err(), "Expected mutual exclusion error");
    }

    #[test]
    fn test_config_conflicts_with_single_display_flags() {
        let cli = Cli::try_parse_from([
            "typewriter",
            "run",
            "--config",
            "c.yaml",
            "--prefix",
            "> ",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let cli = Cli::try_parse_from(["typewriter", "run", "--duration", "forever"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_preview_defaults() {
        let cli = parse(&["typewriter", "preview", "--phrases", "Go"]);
        let Commands::Preview(args) = cli.command else {
            panic!("Expected PreviewArgs");
        };
        assert_eq!(args.duration, Duration::from_secs(5));
        assert_eq!(args.format, OutputFormat::Human);
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["typewriter", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["typewriter", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_color_choices_parse() {
        for variant in ["auto", "always", "never"] {
            let cli = Cli::try_parse_from(["typewriter", "--color", variant, "run"]);
            assert!(cli.is_ok(), "Failed to parse color={variant}");
        }
    }

    #[test]
    fn test_validate_requires_files() {
        let result = Cli::try_parse_from(["typewriter", "validate"]);
        assert!(result.is_err(), "Expected error for missing files");
    }

    #[test]
    fn test_validate_strict_json() {
        let cli = parse(&["typewriter", "validate", "a.yaml", "b.yaml", "--strict", "-f", "json"]);
        let Commands::Validate(args) = cli.command else {
            panic!("Expected ValidateArgs");
        };
        assert_eq!(args.files.len(), 2);
        assert!(args.strict);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_completions_shells_parse() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            let cli = Cli::try_parse_from(["typewriter", "completions", shell]);
            assert!(cli.is_ok(), "Failed to parse shell={shell}");
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["typewriter", "-vvv", "--quiet", "--log-format", "json", "run"]);
        assert_eq!(cli.verbose, 3);
        assert!(cli.quiet);
        assert_eq!(cli.log_format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
