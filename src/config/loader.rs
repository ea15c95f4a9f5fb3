//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size limit check
//! 2. UTF-8 BOM strip
//! 3. Environment variable expansion (pre-parse, on raw text)
//! 4. YAML parsing
//! 5. Deserialization to typed config
//! 6. Validation
//! 7. Freeze with `Arc`

use crate::config::schema::TypewriterConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

use serde_yaml::Value;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits for configuration size.
    pub config_limits: ConfigLimits,
}

/// Limits for configuration size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of displays.
    pub max_displays: usize,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_displays: env_or("TYPEWRITER_MAX_DISPLAYS", 32),
            max_config_size: env_or("TYPEWRITER_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<TypewriterConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Configuration loader.
///
/// Handles the full loading pipeline from YAML file to frozen
/// `TypewriterConfig`.
#[derive(Debug)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing or deserialization fails
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let max_size = self.options.config_limits.max_config_size;

        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > max_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {max_size} bytes"),
            });
        }

        let raw_content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw_content, path)
    }

    /// Runs the pipeline on already-read text. `origin` is only used in
    /// error messages and warning locations.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file access failures.
    pub fn load_str(&self, raw_content: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let raw_content = raw_content.strip_prefix('\u{feff}').unwrap_or(raw_content);

        // Stage 1: Environment variable substitution (before YAML parsing)
        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw_content, origin)?;
        warnings.extend(env_sub.warnings);

        // Stage 2: YAML parsing
        let root: Value = serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        // Stage 3: Deserialize to typed config
        let config: TypewriterConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: format!("Failed to deserialize configuration: {e}"),
            })?;

        // Stage 4: Validation
        let validation_result = Validator::new().validate(&config, &self.options.config_limits);

        if validation_result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: validation_result.errors,
            });
        }

        warnings.extend(validation_result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text BEFORE parsing so substituted values still go
/// through YAML type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

/// A parsed `${...}` reference.
struct VarRef {
    name: String,
    fallback: Option<Fallback>,
}

enum Fallback {
    /// `${VAR:-default}`
    Default(String),
    /// `${VAR:?message}`
    Required(String),
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset, with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw_yaml: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let var = Self::parse_var_ref(&mut chars, source_path)?;
                    match (std::env::var(&var.name), var.fallback) {
                        (Ok(value), _) => result.push_str(&value),
                        (Err(_), Some(Fallback::Default(default))) => result.push_str(&default),
                        (Err(_), Some(Fallback::Required(message))) => {
                            return Err(ConfigError::EnvVarNotSet {
                                var: var.name,
                                location: message,
                            });
                        }
                        (Err(_), None) => self.warnings.push(LoadWarning {
                            message: format!(
                                "Environment variable '{}' is not set, using empty string",
                                var.name
                            ),
                            location: Some(source_path.display().to_string()),
                        }),
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Parses the inside of `${...}`; the opening brace is already consumed.
    fn parse_var_ref(chars: &mut Chars<'_>, source_path: &Path) -> Result<VarRef, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next() {
            match c {
                '}' => return Ok(VarRef { name, fallback: None }),
                ':' => match chars.peek() {
                    Some('-') => {
                        chars.next();
                        let default = Self::read_until_close(chars, &name, source_path)?;
                        return Ok(VarRef {
                            name,
                            fallback: Some(Fallback::Default(default)),
                        });
                    }
                    Some('?') => {
                        chars.next();
                        let message = Self::read_until_close(chars, &name, source_path)?;
                        return Ok(VarRef {
                            name,
                            fallback: Some(Fallback::Required(message)),
                        });
                    }
                    _ => name.push(':'),
                },
                _ => name.push(c),
            }
        }

        Err(unclosed(&name, source_path))
    }

    /// Reads until the matching `}`, keeping nested braces.
    fn read_until_close(
        chars: &mut Chars<'_>,
        name: &str,
        source_path: &Path,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1usize;

        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }

        Err(unclosed(name, source_path))
    }
}

fn unclosed(name: &str, source_path: &Path) -> ConfigError {
    ConfigError::ParseError {
        path: source_path.to_path_buf(),
        line: None,
        message: format!("Unclosed environment variable reference: ${{{name}"),
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_substitution_simple() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("path: ${PATH}", Path::new("test.yaml"))
            .unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
    }

    #[test]
    fn test_env_substitution_default() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute(
                "value: ${TYPEWRITER_TEST_NONEXISTENT_VAR_XYZ123:-Go|Rust}",
                Path::new("test.yaml"),
            )
            .unwrap();
        assert_eq!(result, "value: Go|Rust");
        assert!(sub.warnings.is_empty());
    }

    #[test]
    fn test_env_substitution_nested_braces_in_default() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute(
                "output: ${TYPEWRITER_TEST_NONEXISTENT_VAR_XYZ123:-{file: a.txt}}",
                Path::new("test.yaml"),
            )
            .unwrap();
        assert_eq!(result, "output: {file: a.txt}");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute(
            "value: ${TYPEWRITER_TEST_REQUIRED_XYZ123:?must be set}",
            Path::new("test.yaml"),
        );
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "TYPEWRITER_TEST_REQUIRED_XYZ123");
                assert_eq!(location, "must be set");
            }
            other => panic!("Expected EnvVarNotSet error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("prefix: $$100 ", Path::new("test.yaml"))
            .unwrap();
        assert_eq!(result, "prefix: $100 ");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute(
                "value: ${TYPEWRITER_TEST_MISSING_XYZ123}",
                Path::new("test.yaml"),
            )
            .unwrap();
        assert_eq!(result, "value: ");
        assert_eq!(sub.warnings.len(), 1);
        assert!(sub.warnings[0].message.contains("TYPEWRITER_TEST_MISSING_XYZ123"));
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("value: ${OOPS", Path::new("test.yaml"));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config(
            "displays:\n  - name: hero\n    phrases: \"Go|Rust\"\n    prefix: \"We build \"\n",
        );
        let result = ConfigLoader::with_defaults().load(file.path()).unwrap();
        assert_eq!(result.config.displays.len(), 1);
        assert_eq!(result.config.displays[0].prefix, "We build ");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_strips_bom() {
        let loader = ConfigLoader::with_defaults();
        let result = loader
            .load_str("\u{feff}displays:\n  - name: hero\n", Path::new("bom.yaml"))
            .unwrap();
        assert_eq!(result.config.displays[0].name, "hero");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::with_defaults().load(Path::new("/nonexistent/typewriter.yaml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_config("");
        let result = ConfigLoader::with_defaults().load(file.path());
        match result {
            Err(ConfigError::ParseError { message, .. }) => assert!(message.contains("empty")),
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_oversized_file() {
        let file = write_config("displays:\n  - name: hero\n");
        let loader = ConfigLoader::new(LoaderOptions {
            config_limits: ConfigLimits {
                max_displays: 32,
                max_config_size: 8,
            },
        });
        let result = loader.load(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { field, .. }) if field == "file_size"));
    }

    #[test]
    fn test_load_yaml_syntax_error_has_line() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load_str("displays:\n  - name: [unclosed\n", Path::new("bad.yaml"));
        match result {
            Err(ConfigError::ParseError { line, .. }) => assert!(line.is_some()),
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_validation_errors_are_collected() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load_str(
            "displays:\n  - name: a\n  - name: a\n    timing: { type_delay: 0 }\n",
            Path::new("dupes.yaml"),
        );
        match result {
            Err(ConfigError::ValidationError { path, errors }) => {
                assert_eq!(path, "dupes.yaml");
                assert!(errors.len() >= 2, "got {errors:?}");
            }
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_surfaces_validation_warnings() {
        let loader = ConfigLoader::with_defaults();
        let result = loader
            .load_str(
                "displays:\n  - name: hero\n    timing: { delete_delay: 500ms }\n",
                Path::new("slow.yaml"),
            )
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].location.as_deref(),
            Some("displays[0].timing.delete_delay")
        );
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("TYPEWRITER_TEST_UNSET_LIMIT_XYZ123", 7usize), 7);
    }
}
