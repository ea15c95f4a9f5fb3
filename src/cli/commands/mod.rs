//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod preview;
pub mod run;
pub mod validate;
pub mod version;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, SourceArgs};
use crate::config::loader::{ConfigLimits, ConfigLoader, LoadWarning};
use crate::config::schema::{DisplayConfig, OutputTarget, PhraseSource, TypewriterConfig};
use crate::config::validation::Validator;
use crate::error::{ConfigError, TypewriterError};

/// Name of the display built from command-line flags.
pub const CLI_DISPLAY_NAME: &str = "main";

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` is triggered by the process signal handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), TypewriterError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Preview(args) => preview::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Command-line overrides for the single display built without `--config`.
#[derive(Debug, Clone, Default)]
pub struct SingleDisplay {
    /// Text before the phrase.
    pub prefix: Option<String>,
    /// Cursor glyph.
    pub cursor: Option<String>,
    /// Render destination.
    pub output: Option<OutputTarget>,
}

/// Resolves the configuration a command operates on: the `--config` file
/// when given, otherwise one display built from the flags.
///
/// Load warnings are logged.
///
/// # Errors
///
/// Returns a config error when the file fails to load or validate.
pub fn load_source(
    source: &SourceArgs,
    single: SingleDisplay,
) -> Result<Arc<TypewriterConfig>, TypewriterError> {
    if let Some(ref path) = source.config {
        tracing::info!(config = %path.display(), "loading configuration");
        let result = ConfigLoader::with_defaults().load(path)?;
        log_warnings(&result.warnings);
        return Ok(result.config);
    }

    let config = TypewriterConfig {
        displays: vec![DisplayConfig {
            phrases: source.phrases.clone().map(PhraseSource::Delimited),
            output: single.output.unwrap_or_default(),
            prefix: single.prefix.unwrap_or_default(),
            cursor: single.cursor.unwrap_or_default(),
            ..DisplayConfig::new(CLI_DISPLAY_NAME)
        }],
        ..TypewriterConfig::default()
    };

    let validation = Validator::new().validate(&config, &ConfigLimits::default());
    if validation.has_errors() {
        return Err(ConfigError::ValidationError {
            path: "<command line>".to_string(),
            errors: validation.errors,
        }
        .into());
    }
    for issue in &validation.warnings {
        tracing::warn!(location = %issue.path, "{}", issue.message);
    }

    Ok(Arc::new(config))
}

fn log_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
}
