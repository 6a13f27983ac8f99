// LogcatView - platform/config.rs
//
// Configuration directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::filter::{self, FilterDefinition};
use crate::core::model::Severity;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogcatView configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logcatview/ or %APPDATA%\LogcatView\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file can be used
/// with an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[filter]` section.
    pub filter: FilterSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[[filters]]` preset tables.
    pub filters: Vec<RawFilterPreset>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Files larger than this are memory-mapped.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[filter]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Initial minimum severity of the live filter.
    pub default_level: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// One `[[filters]]` table.
///
/// `level` stays a string here so a bad value is reported against its
/// preset instead of failing the whole file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawFilterPreset {
    pub name: String,
    pub tag: String,
    pub text: String,
    pub pid: String,
    pub tid: String,
    /// Minimum severity: a name or letter in any case (`"warn"`, `"E"`).
    pub level: Option<String>,
    pub pid_hide_list: Vec<String>,
    pub tag_show_list: Vec<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Files above this size are memory-mapped.
    pub large_file_threshold: u64,

    /// Initial minimum severity of the live filter.
    pub default_level: Severity,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,

    /// Preset filters shown after the built-in one.
    pub filters: Vec<FilterDefinition>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            default_level: Severity::Verbose,
            log_level: None,
            log_file: None,
            filters: Vec::new(),
        }
    }
}

fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file cannot be read or parsed, returns defaults with one warning.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(&config_path) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Parsing: large_file_threshold_bytes --
    if let Some(bytes) = raw.parsing.large_file_threshold_bytes {
        if bytes >= constants::MIN_LARGE_FILE_THRESHOLD {
            config.large_file_threshold = bytes;
        } else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "parsing.large_file_threshold_bytes".to_string(),
                    value: bytes.to_string(),
                    expected: format!(
                        "at least {}. Using default ({})",
                        constants::MIN_LARGE_FILE_THRESHOLD,
                        constants::DEFAULT_LARGE_FILE_THRESHOLD
                    ),
                }
                .to_string(),
            );
        }
    }

    // -- Filter: default_level --
    if let Some(ref level) = raw.filter.default_level {
        match Severity::from_name(level) {
            Some(severity) => config.default_level = severity,
            None => warnings.push(format!(
                "[filter] default_level = \"{level}\" is not recognised. \
                 Valid values: verbose, debug, info, warn, error, assert. Using default (verbose).",
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    // -- Filter presets --
    for (idx, preset) in raw.filters.into_iter().enumerate() {
        let name = preset.name.trim();
        if name.is_empty() {
            warnings.push(format!("[[filters]] entry {} has no name; skipped.", idx + 1));
            continue;
        }
        // An invalid pattern does not drop the preset; the condition is
        // disabled when the filter is compiled.
        for (field, pattern) in [("tag", &preset.tag), ("text", &preset.text)] {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            if let Err(e) = filter::compile_pattern(field, pattern) {
                warnings.push(format!(
                    "[[filters]] \"{name}\": {e}. The {field} condition is ignored."
                ));
            }
        }
        let level = match preset.level {
            None => Severity::Verbose,
            Some(ref level) => Severity::from_name(level).unwrap_or_else(|| {
                warnings.push(format!(
                    "[[filters]] \"{name}\": level = \"{level}\" is not recognised. \
                     Valid values: verbose, debug, info, warn, error, assert. Using verbose.",
                ));
                Severity::Verbose
            }),
        };
        config.filters.push(FilterDefinition {
            name: name.to_string(),
            tag: preset.tag,
            text: preset.text,
            pid: preset.pid,
            tid: preset.tid,
            level,
            pid_hide_list: preset.pid_hide_list,
            tag_show_list: preset.tag_show_list,
        });
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(
            config.large_file_threshold,
            constants::DEFAULT_LARGE_FILE_THRESHOLD
        );
        assert_eq!(config.default_level, Severity::Verbose);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_full_config_is_applied() {
        let dir = write_config(
            r#"
[parsing]
large_file_threshold_bytes = 2097152

[filter]
default_level = "warn"

[logging]
level = "debug"
file = "/tmp/logcatview.log"

[[filters]]
name = "errors"
level = "error"

[[filters]]
name = "network"
tag = "net|wifi"
pid_hide_list = ["1"]
tag_show_list = ["WifiService"]
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.large_file_threshold, 2_097_152);
        assert_eq!(config.default_level, Severity::Warn);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/logcatview.log"));
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].level, Severity::Error);
        assert_eq!(config.filters[1].tag, "net|wifi");
        assert_eq!(config.filters[1].tag_show_list, vec!["WifiService".to_string()]);
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let dir = write_config(
            r#"
[parsing]
large_file_threshold_bytes = 10

[filter]
default_level = "loud"

[logging]
level = "chatty"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(
            config.large_file_threshold,
            constants::DEFAULT_LARGE_FILE_THRESHOLD
        );
        assert_eq!(config.default_level, Severity::Verbose);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_config_uses_defaults() {
        let dir = write_config("[parsing\nlarge_file_threshold_bytes = ");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("parse error"), "{}", warnings[0]);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_preset_checks() {
        let dir = write_config(
            r#"
[[filters]]
name = ""

[[filters]]
name = "broken"
text = "[oops"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert_eq!(config.filters.len(), 1);
        assert_eq!(config.filters[0].name, "broken");
    }

    #[test]
    fn test_preset_level_accepts_letters_and_any_case() {
        let dir = write_config(
            r#"
[[filters]]
name = "errors"
level = "E"

[[filters]]
name = "warnings"
level = "Warn"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.filters[0].level, Severity::Error);
        assert_eq!(config.filters[1].level, Severity::Warn);
    }

    #[test]
    fn test_bad_preset_level_only_affects_that_preset() {
        let dir = write_config(
            r#"
[filter]
default_level = "warn"

[[filters]]
name = "noisy"
level = "loud"
tag = "net"

[[filters]]
name = "errors"
level = "error"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("noisy"), "{}", warnings[0]);
        assert_eq!(config.default_level, Severity::Warn);
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].level, Severity::Verbose);
        assert_eq!(config.filters[0].tag, "net");
        assert_eq!(config.filters[1].level, Severity::Error);
    }
}
