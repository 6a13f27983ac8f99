// LogcatView - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Severity
// =============================================================================

/// Logcat priority levels, ordered from least to most severe.
///
/// The derived ordering is the filter ordering: a filter with minimum level
/// `Warn` accepts `Warn`, `Error` and `Assert`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl Severity {
    /// Returns all variants in priority order (least severe first).
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Verbose,
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Assert,
        ]
    }

    /// Decode a single-letter priority code.
    ///
    /// `F` is what `Log.wtf()` actually emits, so it is folded into `Assert`.
    pub fn from_letter(code: &str) -> Option<Severity> {
        match code {
            "V" => Some(Severity::Verbose),
            "D" => Some(Severity::Debug),
            "I" => Some(Severity::Info),
            "W" => Some(Severity::Warn),
            "E" => Some(Severity::Error),
            "A" | "F" => Some(Severity::Assert),
            _ => None,
        }
    }

    /// Decode a spelled-out priority word as written by the DDMS "save" action.
    pub fn from_word(word: &str) -> Option<Severity> {
        match word {
            "VERBOSE" => Some(Severity::Verbose),
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "ASSERT" => Some(Severity::Assert),
            _ => None,
        }
    }

    /// Lenient decoding for user input (CLI flags, config values):
    /// accepts any letter or word in any case.
    pub fn from_name(name: &str) -> Option<Severity> {
        let upper = name.trim().to_uppercase();
        Self::from_word(&upper).or_else(|| Self::from_letter(&upper))
    }

    /// Single-letter code used in logcat output.
    pub fn letter(&self) -> char {
        match self {
            Severity::Verbose => 'V',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
            Severity::Assert => 'A',
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Assert => "assert",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Log record (normalised output of parsing)
// =============================================================================

/// A single decoded logcat line.
///
/// Records are never mutated after parsing. For the long format one record is
/// produced per message line, all sharing the attributes of their header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub severity: Severity,

    /// Process ID, or `"?"` when unknown.
    pub pid: String,

    /// Thread ID; empty or `"?"` for formats that do not carry one.
    pub tid: String,

    /// Never empty. Commas are replaced with underscores.
    pub tag: String,

    /// `MM-DD HH:MM:SS.fff`, lexically comparable within one year of logs.
    pub time: String,

    pub message: String,
}

impl LogRecord {
    /// Build a record, normalising the tag. Returns `None` for an empty tag.
    pub fn new(
        severity: Severity,
        pid: &str,
        tid: &str,
        tag: &str,
        time: &str,
        message: &str,
    ) -> Option<LogRecord> {
        let tag = normalize_tag(tag)?;
        Some(LogRecord {
            severity,
            pid: pid.trim().to_string(),
            tid: tid.trim().to_string(),
            tag,
            time: time.to_string(),
            message: message.to_string(),
        })
    }

    /// Placeholder record for a line that does not fit the committed format.
    pub fn unknown_format(line: &str) -> LogRecord {
        LogRecord {
            severity: Severity::Warn,
            pid: String::new(),
            tid: String::new(),
            tag: constants::UNKNOWN_FORMAT_TAG.to_string(),
            time: String::new(),
            message: line.to_string(),
        }
    }

    /// True for records produced by [`LogRecord::unknown_format`].
    pub fn is_unknown_format(&self) -> bool {
        self.tag == constants::UNKNOWN_FORMAT_TAG && self.pid.is_empty() && self.time.is_empty()
    }
}

/// Renders the record in the viewer's copy/save line form, which the
/// grammars read back:
///
/// - timed records use the time form, `04-08 12:57:40.370: I/Installer(89): connecting...`
/// - records without a time (brief input) use the brief form, `I/MediaUploader(22541): ...`
/// - UNKNOWN_FORMAT placeholders are written as the raw line they wrap
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown_format() {
            return f.write_str(&self.message);
        }
        if self.time.is_empty() || self.time == constants::UNKNOWN_FIELD {
            return write!(
                f,
                "{}/{}({}): {}",
                self.severity.letter(),
                self.tag,
                self.pid,
                self.message
            );
        }
        write!(
            f,
            "{}: {}/{}({}): {}",
            self.time,
            self.severity.letter(),
            self.tag,
            self.pid,
            self.message
        )
    }
}

/// Trim the tag and replace commas, which collide with downstream
/// delimiters. An empty tag yields `None`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    if tag.is_empty() {
        return None;
    }
    Some(tag.replace(',', "_"))
}

// =============================================================================
// Channels and sources
// =============================================================================

/// The three logcat buffers a viewer panel can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Main,
    Events,
    Radio,
}

impl Channel {
    pub fn all() -> &'static [Channel] {
        &[Channel::Main, Channel::Events, Channel::Radio]
    }

    /// Route a file to a channel by case-insensitive filename fragment.
    /// `main` is checked first, then `event`, then `radio`.
    pub fn from_file_name(name: &str) -> Option<Channel> {
        let lower = name.to_lowercase();
        if lower.contains(constants::MAIN_FILE_HINT) {
            Some(Channel::Main)
        } else if lower.contains(constants::EVENTS_FILE_HINT) {
            Some(Channel::Events)
        } else if lower.contains(constants::RADIO_FILE_HINT) {
            Some(Channel::Radio)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Main => "main",
            Channel::Events => "events",
            Channel::Radio => "radio",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The file a batch of records was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// File name without directories.
    pub name: String,

    /// Absolute path (made absolute against the working directory when the
    /// caller supplied a relative one).
    pub path: PathBuf,
}

impl SourceFile {
    pub fn from_path(path: &Path) -> SourceFile {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        SourceFile { name, path }
    }
}

/// Records delivered together for one channel from one file.
#[derive(Debug, Clone, Serialize)]
pub struct RecordBatch {
    pub channel: Channel,
    pub file: SourceFile,
    pub records: Vec<LogRecord>,
}
