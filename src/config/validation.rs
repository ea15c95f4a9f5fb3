//! Configuration validation
//!
//! Semantic checks on a deserialized `TypewriterConfig`. Validation
//! collects ALL issues instead of stopping at the first one.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{DisplayConfig, OutputTarget, PhraseSource, TimingConfig, TypewriterConfig};
use crate::error::{Severity, ValidationIssue};
use crate::typing::Timing;
use crate::typing::phrases::PHRASE_SEPARATOR;

use std::collections::HashMap;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every error and warning found.
    pub fn validate(
        &mut self,
        config: &TypewriterConfig,
        limits: &ConfigLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_display_count(config, limits);
        self.validate_timing("timing", &config.timing);
        self.validate_delay_ratio("timing", config.timing.apply(Timing::default()));
        self.validate_names(config);
        self.validate_outputs(config);

        for (index, display) in config.displays.iter().enumerate() {
            self.validate_display(config, index, display);
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Top-level checks
    // ========================================================================

    fn validate_display_count(&mut self, config: &TypewriterConfig, limits: &ConfigLimits) {
        if config.displays.is_empty() {
            self.add_error("displays", "At least one display is required");
        }
        if config.displays.len() > limits.max_displays {
            self.add_error(
                "displays",
                format!(
                    "Too many displays: {} (limit {}, see TYPEWRITER_MAX_DISPLAYS)",
                    config.displays.len(),
                    limits.max_displays
                ),
            );
        }
    }

    fn validate_names(&mut self, config: &TypewriterConfig) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, display) in config.displays.iter().enumerate() {
            let name = display.name.trim();
            if name.is_empty() {
                self.add_error(
                    format!("displays[{index}].name"),
                    "Display name is required and cannot be empty",
                );
                continue;
            }
            if let Some(first) = seen.insert(name, index) {
                self.add_error(
                    format!("displays[{index}].name"),
                    format!("Duplicate display name '{name}' (first defined at displays[{first}])"),
                );
            }
        }
    }

    /// Two engines writing the same stream or file would overwrite each other.
    fn validate_outputs(&mut self, config: &TypewriterConfig) {
        let mut seen: HashMap<&OutputTarget, usize> = HashMap::new();
        for (index, display) in config.displays.iter().enumerate() {
            if let Some(first) = seen.insert(&display.output, index) {
                self.add_error(
                    format!("displays[{index}].output"),
                    format!(
                        "Output '{}' is already used by displays[{first}]",
                        display.output
                    ),
                );
            }
        }
    }

    // ========================================================================
    // Per-display checks
    // ========================================================================

    fn validate_display(&mut self, config: &TypewriterConfig, index: usize, display: &DisplayConfig) {
        let path = format!("displays[{index}]");

        self.validate_timing(&format!("{path}.timing"), &display.timing);
        if display.timing.type_delay.is_some() || display.timing.delete_delay.is_some() {
            self.validate_delay_ratio(&format!("{path}.timing"), config.timing_for(display));
        }

        if let OutputTarget::File(file) = &display.output
            && file.as_os_str().is_empty()
        {
            self.add_error(format!("{path}.output.file"), "File output path cannot be empty");
        }

        self.validate_phrases(config, &path, display);
    }

    fn validate_phrases(&mut self, config: &TypewriterConfig, path: &str, display: &DisplayConfig) {
        let has_defaults = !config.default_phrases().iter().all(|p| p.trim().is_empty());
        let own_blank = display
            .phrases
            .as_ref()
            .is_some_and(|source| source.to_list().is_none());

        match (own_blank, has_defaults) {
            (true, true) => self.add_warning(
                format!("{path}.phrases"),
                "Phrases contain no text, falling back to defaults",
            ),
            (_, false) if display.phrases.as_ref().is_none_or(|s| s.to_list().is_none()) => {
                self.add_warning(
                    format!("{path}.phrases"),
                    format!(
                        "Display '{}' has no phrases and no defaults, it will not start",
                        display.name
                    ),
                );
            }
            _ => {}
        }

        if let Some(PhraseSource::List(items)) = &display.phrases
            && items.iter().any(|p| p.contains(PHRASE_SEPARATOR))
        {
            self.add_warning(
                format!("{path}.phrases"),
                "List entries containing '|' are kept as single phrases",
            );
        }
    }

    fn validate_timing(&mut self, path: &str, timing: &TimingConfig) {
        if timing.type_delay.is_some_and(|d| d.is_zero()) {
            self.add_error(format!("{path}.type_delay"), "type_delay must be greater than zero");
        }
        if timing.delete_delay.is_some_and(|d| d.is_zero()) {
            self.add_error(
                format!("{path}.delete_delay"),
                "delete_delay must be greater than zero",
            );
        }
    }

    fn validate_delay_ratio(&mut self, path: &str, timing: Timing) {
        if timing.delete_delay > timing.type_delay {
            self.add_warning(
                format!("{path}.delete_delay"),
                format!(
                    "delete_delay ({}) is slower than type_delay ({})",
                    humantime::format_duration(timing.delete_delay),
                    humantime::format_duration(timing.type_delay)
                ),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}
