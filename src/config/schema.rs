//! Configuration schema types
//!
//! Core configuration types deserialized from `typewriter` YAML files.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::Decoration;
use crate::typing::{DEFAULT_PHRASES, PhraseList, Timing};

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration: a set of display targets, each with its own engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TypewriterConfig {
    /// Fallback phrases for displays without their own. `None` means the
    /// built-in list; an explicit empty list means no fallback at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Vec<String>>,

    /// Timing shared by every display unless overridden.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Display targets, one engine each.
    #[serde(default)]
    pub displays: Vec<DisplayConfig>,
}

impl TypewriterConfig {
    /// Fallback phrases as string slices.
    #[must_use]
    pub fn default_phrases(&self) -> Vec<&str> {
        self.defaults.as_ref().map_or_else(
            || DEFAULT_PHRASES.to_vec(),
            |d| d.iter().map(String::as_str).collect(),
        )
    }

    /// Effective timing for `display`: built-in defaults, then the
    /// top-level section, then the display's own overrides.
    #[must_use]
    pub fn timing_for(&self, display: &DisplayConfig) -> Timing {
        display.timing.apply(self.timing.apply(Timing::default()))
    }

    /// Phrases for `display`, or `None` when its engine must not start.
    #[must_use]
    pub fn phrases_for(&self, display: &DisplayConfig) -> Option<PhraseList> {
        display
            .phrases
            .as_ref()
            .and_then(PhraseSource::to_list)
            .or_else(|| {
                PhraseList::new(
                    self.default_phrases()
                        .into_iter()
                        .map(str::trim)
                        .filter(|p| !p.is_empty()),
                )
            })
    }
}

// ============================================================================
// Display
// ============================================================================

/// One display target and its engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct DisplayConfig {
    /// Unique display name, used in logs, events and metrics.
    pub name: String,

    /// Phrase source; falls back to the top-level defaults when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrases: Option<PhraseSource>,

    /// Where the text is rendered.
    #[serde(default)]
    pub output: OutputTarget,

    /// Static text before the animated phrase.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,

    /// Cursor glyph after the animated phrase.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cursor: String,

    /// Per-display timing overrides.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl DisplayConfig {
    /// Creates a stdout display with no decoration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phrases: None,
            output: OutputTarget::default(),
            prefix: String::new(),
            cursor: String::new(),
            timing: TimingConfig::default(),
        }
    }

    /// Prefix and cursor as a [`Decoration`].
    #[must_use]
    pub fn decoration(&self) -> Decoration {
        Decoration {
            prefix: self.prefix.clone(),
            cursor: self.cursor.clone(),
        }
    }
}

/// Phrases as a pipe-delimited attribute or as a YAML list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhraseSource {
    /// `"Go|Rust|Zig"`
    Delimited(String),
    /// `["Go", "Rust", "Zig"]`
    List(Vec<String>),
}

impl PhraseSource {
    /// Parses the source; `None` when it yields no phrase.
    #[must_use]
    pub fn to_list(&self) -> Option<PhraseList> {
        match self {
            Self::Delimited(attr) => PhraseList::parse(attr),
            Self::List(items) => {
                PhraseList::new(items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()))
            }
        }
    }
}

/// Render destination of a display.
///
/// In YAML: `stdout`, `stderr` or `{ file: path }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOutput", into = "RawOutput")]
pub enum OutputTarget {
    /// Rewrite one line on stdout.
    #[default]
    Stdout,
    /// Rewrite one line on stderr.
    Stderr,
    /// Replace the contents of a file.
    File(PathBuf),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawOutput {
    Named(String),
    File { file: PathBuf },
}

impl TryFrom<RawOutput> for OutputTarget {
    type Error = String;

    fn try_from(raw: RawOutput) -> Result<Self, Self::Error> {
        match raw {
            RawOutput::Named(name) => match name.as_str() {
                "stdout" => Ok(Self::Stdout),
                "stderr" => Ok(Self::Stderr),
                other => Err(format!(
                    "unknown output '{other}', expected stdout, stderr or {{ file: path }}"
                )),
            },
            RawOutput::File { file } => Ok(Self::File(file)),
        }
    }
}

impl From<OutputTarget> for RawOutput {
    fn from(target: OutputTarget) -> Self {
        match target {
            OutputTarget::Stdout => Self::Named("stdout".to_string()),
            OutputTarget::Stderr => Self::Named("stderr".to_string()),
            OutputTarget::File(file) => Self::File { file },
        }
    }
}

impl FromStr for OutputTarget {
    type Err = std::convert::Infallible;

    /// `stdout` or `-`, `stderr`, otherwise a file path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "stdout" | "-" => Self::Stdout,
            "stderr" => Self::Stderr,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Optional timing overrides. Durations accept humantime strings
/// (`"150ms"`, `"2s"`) or bare integers in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TimingConfig {
    /// Delay after each typed character.
    #[serde(default, with = "duration_opt", skip_serializing_if = "Option::is_none")]
    pub type_delay: Option<Duration>,

    /// Delay after each deleted character.
    #[serde(default, with = "duration_opt", skip_serializing_if = "Option::is_none")]
    pub delete_delay: Option<Duration>,

    /// Hold time for a fully typed phrase.
    #[serde(default, with = "duration_opt", skip_serializing_if = "Option::is_none")]
    pub hold: Option<Duration>,

    /// Gap before the next phrase.
    #[serde(default, with = "duration_opt", skip_serializing_if = "Option::is_none")]
    pub advance_delay: Option<Duration>,
}

impl TimingConfig {
    /// Overrides the fields of `base` that are set here.
    #[must_use]
    pub fn apply(&self, base: Timing) -> Timing {
        Timing {
            type_delay: self.type_delay.unwrap_or(base.type_delay),
            delete_delay: self.delete_delay.unwrap_or(base.delete_delay),
            hold: self.hold.unwrap_or(base.hold),
            advance_delay: self.advance_delay.unwrap_or(base.advance_delay),
        }
    }
}

/// Serde adapter for `Option<Duration>` as humantime text or milliseconds.
mod duration_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&humantime::format_duration(*d).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Millis(ms)) => Ok(Some(Duration::from_millis(ms))),
            Some(Raw::Text(text)) => humantime::parse_duration(text.trim())
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid duration '{text}': {e}"))),
        }
    }
}
