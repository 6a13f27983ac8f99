// LogcatView - core/bugreport.rs
//
// Splits an Android bug report into its main, events and radio logcat
// sections. Every section of a bug report is written in threadtime format,
// so each one is parsed with that processor directly, without detection.

use crate::core::format::FormatKind;
use crate::core::model::{Channel, LogRecord};
use crate::core::parser;
use crate::util::constants;

/// Raw trimmed lines of each log section, marker lines excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugReportSections {
    pub main: Vec<String>,
    pub events: Vec<String>,
    pub radio: Vec<String>,
}

impl BugReportSections {
    /// Sections in channel order, including empty ones.
    pub fn groups(&self) -> [(Channel, &[String]); 3] {
        [
            (Channel::Main, self.main.as_slice()),
            (Channel::Events, self.events.as_slice()),
            (Channel::Radio, self.radio.as_slice()),
        ]
    }
}

/// Position of the splitter within the report. The sections always appear
/// in this order; a marker is only recognised in the state just before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    SeekingMainStart,
    InMain,
    InEvents,
    InRadio,
    Done,
}

/// Group the lines of a bug report by section.
///
/// Everything before the system log marker and everything from the
/// `[logcat:` terminator onward is discarded.
pub fn split_bug_report<S: AsRef<str>>(lines: &[S]) -> BugReportSections {
    let mut sections = BugReportSections::default();
    let mut state = SplitState::SeekingMainStart;

    for raw in lines {
        let line = raw.as_ref().trim();
        state = match state {
            SplitState::SeekingMainStart => {
                if line.starts_with(constants::BUGREPORT_MAIN_MARKER) {
                    SplitState::InMain
                } else {
                    SplitState::SeekingMainStart
                }
            }
            SplitState::InMain => {
                if line.starts_with(constants::BUGREPORT_EVENTS_MARKER) {
                    SplitState::InEvents
                } else {
                    sections.main.push(line.to_string());
                    SplitState::InMain
                }
            }
            SplitState::InEvents => {
                if line.starts_with(constants::BUGREPORT_RADIO_MARKER) {
                    SplitState::InRadio
                } else {
                    sections.events.push(line.to_string());
                    SplitState::InEvents
                }
            }
            SplitState::InRadio => {
                if line.starts_with(constants::BUGREPORT_END_MARKER) {
                    SplitState::Done
                } else {
                    sections.radio.push(line.to_string());
                    SplitState::InRadio
                }
            }
            SplitState::Done => break,
        };
    }

    tracing::debug!(
        main = sections.main.len(),
        events = sections.events.len(),
        radio = sections.radio.len(),
        finished = state == SplitState::Done,
        "Bug report split"
    );
    sections
}

/// Split a bug report and parse each non-empty section as threadtime.
pub fn parse_bug_report<S: AsRef<str>>(lines: &[S]) -> Vec<(Channel, Vec<LogRecord>)> {
    let sections = split_bug_report(lines);
    sections
        .groups()
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
        .map(|(channel, group)| {
            let result = parser::process_lines(FormatKind::ThreadTime, group);
            (channel, result.records)
        })
        .collect()
}
