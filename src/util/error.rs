// LogcatView - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Nothing in the parsing core is fatal: these errors travel between
// internal layers and are turned into "no records" plus a log line at the
// public loading surface.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogcatView operations.
#[derive(Debug)]
pub enum LogcatError {
    /// Reading log input failed.
    Load(LoadError),

    /// A filter could not be built.
    Filter(FilterError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LogcatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LogcatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors raised while reading log files, folders, or bug reports.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },

    /// A folder load was requested for something that is not a directory.
    NotADirectory { path: PathBuf },

    /// Listing the folder failed.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The input was readable but no file or section produced records.
    NothingLoaded { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "'{}' is not a directory", path.display())
            }
            Self::Traversal { path, source } => {
                write!(f, "Error listing '{}': {source}", path.display())
            }
            Self::NothingLoaded { path } => {
                write!(f, "No logcat records could be loaded from '{}'", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            Self::NotADirectory { .. } | Self::NothingLoaded { .. } => None,
        }
    }
}

impl From<LoadError> for LogcatError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter construction.
#[derive(Debug)]
pub enum FilterError {
    /// A tag or text pattern is not a valid regex.
    InvalidRegex {
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex {
                field,
                pattern,
                source,
            } => write!(f, "Invalid {field} regex '{pattern}': {source}"),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
        }
    }
}

impl From<FilterError> for LogcatError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::ValueOutOfRange { .. } => None,
        }
    }
}

impl From<ConfigError> for LogcatError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogcatView results.
pub type Result<T> = std::result::Result<T, LogcatError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_load_error_display_includes_path() {
        let err = LoadError::Io {
            path: PathBuf::from("/tmp/missing_main.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let text = err.to_string();
        assert!(text.contains("missing_main.txt"), "{text}");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_filter_error_converts_to_top_level() {
        let source = regex::Regex::new("(").unwrap_err();
        let err: LogcatError = FilterError::InvalidRegex {
            field: "tag",
            pattern: "(".to_string(),
            source,
        }
        .into();
        assert!(matches!(err, LogcatError::Filter(_)));
        assert!(err.to_string().starts_with("Filter error: Invalid tag regex '('"));
    }
}
