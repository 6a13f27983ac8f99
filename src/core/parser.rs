// LogcatView - core/parser.rs
//
// Turns raw logcat text into `LogRecord`s.
// Core layer: accepts strings and line slices, never touches the filesystem.
//
// Flow: detect the format from the first recognisable line, then hand that
// line and everything after it to the committed format's processor. Lines
// that do not fit the committed grammar are wrapped as UNKNOWN_FORMAT
// records so no text is lost once a format is locked in.
//
// All state lives on the stack of a single call. In particular the long
// format's "current header" is a local accumulator, so concurrent or
// repeated parses never see each other's state.

use crate::core::format::{self, FormatKind, LineOutcome, LongHeader};
use crate::core::model::{LogRecord, Severity};
use crate::util::logging::preview;

/// Result of parsing one input.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// The committed format. `None` if no line matched any grammar.
    pub format: Option<FormatKind>,

    /// Records in input order.
    pub records: Vec<LogRecord>,

    /// Non-empty lines handed to the format processor.
    pub lines_processed: u64,

    /// Lines that matched the grammar but were dropped (empty tag or an
    /// unknown severity code).
    pub lines_skipped: u64,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Detect the format of `content` and parse it.
pub fn parse_content(content: &str) -> ParseResult {
    let lines: Vec<&str> = content.lines().collect();
    parse_lines(&lines)
}

/// Detect the format from the first recognisable line and parse from there.
///
/// Lines before the committing line are ignored. If no line matches any
/// grammar the result has no format and no records.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> ParseResult {
    let Some((kind, start)) = format::detect_in_lines(lines) else {
        tracing::debug!(lines = lines.len(), "No logcat format recognised");
        return ParseResult::default();
    };

    tracing::debug!(format = %kind, first_line = start + 1, "Format detected");
    process_lines(kind, &lines[start..])
}

/// Parse `lines` with an already-known format.
///
/// Used directly for bug report sections, which are always threadtime.
pub fn process_lines<S: AsRef<str>>(kind: FormatKind, lines: &[S]) -> ParseResult {
    let mut result = if kind.is_multiline() {
        process_long(lines)
    } else {
        process_single_line(kind, lines)
    };
    result.format = Some(kind);

    tracing::debug!(
        format = %kind,
        records = result.records.len(),
        lines = result.lines_processed,
        skipped = result.lines_skipped,
        "Parsing complete"
    );
    result
}

/// Trimmed, non-empty lines.
fn content_lines<S: AsRef<str>>(lines: &[S]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
}

fn process_single_line<S: AsRef<str>>(kind: FormatKind, lines: &[S]) -> ParseResult {
    let mut result = ParseResult::default();

    for line in content_lines(lines) {
        result.lines_processed += 1;
        match format::decode_line(kind, line) {
            LineOutcome::Record(record) => result.records.push(record),
            LineOutcome::Skipped => {
                result.lines_skipped += 1;
                tracing::trace!(line = preview(line), "Skipped line with empty tag or unknown level");
            }
            LineOutcome::Unmatched => result.records.push(LogRecord::unknown_format(line)),
        }
    }

    result
}

/// Header attributes applied to every message line that follows it.
struct ActiveHeader {
    time: String,
    pid: String,
    tid: String,
    severity: Severity,
    tag: String,
}

impl ActiveHeader {
    fn from_decoded(header: LongHeader) -> Option<ActiveHeader> {
        Some(ActiveHeader {
            severity: header.severity?,
            time: header.time,
            pid: header.pid,
            tid: header.tid,
            tag: header.tag,
        })
    }
}

fn process_long<S: AsRef<str>>(lines: &[S]) -> ParseResult {
    let mut result = ParseResult::default();
    let mut current: Option<ActiveHeader> = None;

    for line in content_lines(lines) {
        result.lines_processed += 1;

        if let Some(decoded) = format::decode_long_header(line) {
            // A header with an unusable level does not replace the active one;
            // the lines after it keep the previous header's attributes.
            match ActiveHeader::from_decoded(decoded) {
                Some(header) => current = Some(header),
                None => {
                    result.lines_skipped += 1;
                    tracing::trace!(line = preview(line), "Ignored header with unknown level");
                }
            }
            continue;
        }

        match &current {
            Some(h) => match LogRecord::new(h.severity, &h.pid, &h.tid, &h.tag, &h.time, line) {
                Some(record) => result.records.push(record),
                None => result.lines_skipped += 1,
            },
            // Message text before any header has nothing to attach to.
            None => result.records.push(LogRecord::unknown_format(line)),
        }
    }

    result
}
