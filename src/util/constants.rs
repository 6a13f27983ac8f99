// LogcatView - util/constants.rs
//
// Single source of truth for named constants, grammar markers, limits,
// and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogcatView";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogcatView";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Record field markers
// =============================================================================

/// Placeholder for a field the source format does not carry (pid, tid or
/// time of a brief-format line).
pub const UNKNOWN_FIELD: &str = "?";

/// Tag given to lines that do not match the committed format.
pub const UNKNOWN_FORMAT_TAG: &str = "UNKNOWN_FORMAT";

// =============================================================================
// Bug report section markers
// =============================================================================

/// Introduces the main/system log section of a bug report.
pub const BUGREPORT_MAIN_MARKER: &str = "------ SYSTEM LOG (logcat -v threadtime";

/// Introduces the event log section.
pub const BUGREPORT_EVENTS_MARKER: &str = "------ EVENT LOG (logcat -b events -v threadtime";

/// Introduces the radio log section.
pub const BUGREPORT_RADIO_MARKER: &str = "------ RADIO LOG (logcat -b radio -v threadtime";

/// Terminates collection of the radio section.
pub const BUGREPORT_END_MARKER: &str = "[logcat:";

// =============================================================================
// Filter query keywords
// =============================================================================

pub const PID_KEYWORD: &str = "pid:";
pub const TID_KEYWORD: &str = "tid:";
pub const TAG_KEYWORD: &str = "tag:";
pub const TEXT_KEYWORD: &str = "text:";

/// First element of an auxiliary list that makes it an allow-list.
pub const SHOW_KEYWORD: &str = "show";

/// First element of an auxiliary list that makes it a deny-list.
pub const HIDE_KEYWORD: &str = "hide";

/// Name prefix for filters decoded from the live query box.
pub const LIVE_FILTER_PREFIX: &str = "livefilter-";

/// Name of the built-in filter every panel starts with.
pub const DEFAULT_FILTER_NAME: &str = "All messages (no filters)";

// =============================================================================
// Folder dispatch
// =============================================================================

/// Filename fragment (lowercase) routing a file to the main channel.
pub const MAIN_FILE_HINT: &str = "main";

/// Filename fragment (lowercase) routing a file to the events channel.
pub const EVENTS_FILE_HINT: &str = "event";

/// Filename fragment (lowercase) routing a file to the radio channel.
pub const RADIO_FILE_HINT: &str = "radio";

// =============================================================================
// File reading limits
// =============================================================================

/// File size threshold in bytes above which files are memory-mapped.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Smallest accepted large-file threshold from config.
pub const MIN_LARGE_FILE_THRESHOLD: u64 = 1024 * 1024; // 1 MB

/// Retry limits for transient I/O errors.
pub const MAX_READ_RETRIES: u32 = 3;
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
