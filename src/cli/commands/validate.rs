//! `validate` command: check configuration files without running them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::loader::ConfigLoader;
use crate::error::{ConfigError, TypewriterError, ValidationIssue};

/// Validation outcome for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File that was checked.
    pub file: PathBuf,
    /// Whether the file passed (warnings fail it in strict mode).
    pub valid: bool,
    /// Errors, formatted.
    pub errors: Vec<String>,
    /// Warnings, formatted.
    pub warnings: Vec<String>,
}

/// Validate configuration files without starting any engine.
///
/// # Errors
///
/// Returns an I/O error if any file does not exist, or a config error if
/// any file fails validation (or has warnings under `--strict`).
pub fn run(args: &ValidateArgs) -> Result<(), TypewriterError> {
    for path in &args.files {
        if !path.exists() {
            return Err(TypewriterError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }
    }

    let loader = ConfigLoader::with_defaults();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check(&loader, path, args.strict))
        .collect();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let failed: Vec<_> = reports.iter().filter(|r| !r.valid).collect();
    if failed.is_empty() {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        field: "files".to_string(),
        value: failed
            .iter()
            .map(|r| r.file.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        expected: "valid configuration".to_string(),
    }
    .into())
}

/// Loads one file and turns the result into a [`FileReport`].
pub fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    tracing::info!(file = %path.display(), "validating configuration");

    let (errors, warnings) = match loader.load(path) {
        Ok(result) => (
            Vec::new(),
            result.warnings.iter().map(ToString::to_string).collect(),
        ),
        Err(ConfigError::ValidationError { errors, .. }) => {
            (errors.iter().map(ValidationIssue::to_string).collect(), Vec::new())
        }
        Err(e) => (vec![e.to_string()], Vec::new()),
    };

    let valid = errors.is_empty() && !(strict && !warnings.is_empty());
    FileReport {
        file: path.to_path_buf(),
        valid,
        errors,
        warnings,
    }
}

fn print_human(report: &FileReport) {
    let status = if report.valid { "ok" } else { "FAILED" };
    println!("{}: {status}", report.file.display());
    for error in &report.errors {
        println!("  {error}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_check_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "ok.yaml", "displays:\n  - name: hero\n");
        let report = check(&ConfigLoader::with_defaults(), &path, false);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_check_collects_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "bad.yaml",
            "displays:\n  - name: hero\n  - name: hero\n    output: stderr\n",
        );
        let report = check(&ConfigLoader::with_defaults(), &path, false);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Duplicate display name"));
    }

    #[test]
    fn test_strict_turns_warnings_into_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "warn.yaml",
            "timing:\n  delete_delay: 300ms\ndisplays:\n  - name: hero\n",
        );
        let loader = ConfigLoader::with_defaults();
        assert!(check(&loader, &path, false).valid);

        let strict = check(&loader, &path, true);
        assert!(!strict.valid);
        assert_eq!(strict.warnings.len(), 1);
    }

    #[test]
    fn test_run_missing_file_is_io_error() {
        let args = ValidateArgs {
            files: vec![PathBuf::from("/nonexistent/typewriter.yaml")],
            format: OutputFormat::Human,
            strict: false,
        };
        let err = run(&args).unwrap_err();
        assert!(matches!(err, TypewriterError::Io(_)));
    }

    #[test]
    fn test_run_reports_failed_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_config(dir.path(), "good.yaml", "displays:\n  - name: hero\n");
        let bad = write_config(dir.path(), "bad.yaml", "displays: []\n");
        let args = ValidateArgs {
            files: vec![good, bad],
            format: OutputFormat::Json,
            strict: false,
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::CONFIG_ERROR);
        assert!(err.to_string().contains("bad.yaml"));
        assert!(!err.to_string().contains("good.yaml"));
    }
}
