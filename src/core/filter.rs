// LogcatView - core/filter.rs
//
// Filter engine for log records.
// A filter is a named conjunction of conditions; every configured condition
// must hold for a record to match. A list of filters (the live query) is
// AND-combined as well.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{LogRecord, Severity};
use crate::util::constants;
use crate::util::error::FilterError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// User-facing description of a filter, as stored in config presets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefinition {
    pub name: String,

    /// Regex searched in the tag. Empty = no condition.
    pub tag: String,

    /// Regex searched in the message. Empty = no condition.
    pub text: String,

    /// Exact pid. Empty = no condition.
    pub pid: String,

    /// Exact tid. Empty = no condition.
    pub tid: String,

    /// Minimum severity.
    pub level: Severity,

    /// Records from these pids are rejected.
    pub pid_hide_list: Vec<String>,

    /// If non-empty, only records with one of these tags are accepted.
    pub tag_show_list: Vec<String>,
}

impl FilterDefinition {
    /// A definition with only a name, matching every record.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Compile a tag or text pattern.
///
/// Matching is case-insensitive unless the pattern contains an uppercase
/// character, so `tag:activity` finds `ActivityManager` but `tag:Activity`
/// does not find `activity`.
pub fn compile_pattern(field: &'static str, pattern: &str) -> Result<Regex, FilterError> {
    let case_sensitive = pattern.chars().any(char::is_uppercase);
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| FilterError::InvalidRegex {
            field,
            pattern: pattern.to_string(),
            source: e,
        })
}

/// A compiled filter with its unread counter.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    definition: FilterDefinition,
    tag_regex: Option<Regex>,
    text_regex: Option<Regex>,
    tag_show_set: HashSet<String>,

    /// Auxiliary show/hide selections. The first element is `"show"` or
    /// `"hide"`, the rest are the values it applies to.
    pid_list: Vec<String>,
    tag_list: Vec<String>,

    unread_count: usize,
}

impl FilterSpec {
    /// Compile a definition. String fields are trimmed; an invalid tag or
    /// text regex is logged and that condition is left out.
    pub fn new(definition: FilterDefinition) -> Self {
        let definition = FilterDefinition {
            name: definition.name.trim().to_string(),
            tag: definition.tag.trim().to_string(),
            text: definition.text.trim().to_string(),
            pid: definition.pid.trim().to_string(),
            tid: definition.tid.trim().to_string(),
            ..definition
        };

        let tag_regex = lenient_pattern(&definition.name, "tag", &definition.tag);
        let text_regex = lenient_pattern(&definition.name, "text", &definition.text);
        let tag_show_set = definition.tag_show_list.iter().cloned().collect();

        Self {
            definition,
            tag_regex,
            text_regex,
            tag_show_set,
            pid_list: Vec::new(),
            tag_list: Vec::new(),
            unread_count: 0,
        }
    }

    /// Decode a live query into one filter per whitespace-separated token.
    ///
    /// Tokens prefixed `pid:`, `tid:`, `tag:` or `text:` set that condition;
    /// anything else is a text pattern. An empty query yields a single filter
    /// with no pattern conditions, so `min_level` and the auxiliary lists
    /// still apply.
    pub fn from_query(
        query: &str,
        min_level: Severity,
        pid_list: &[String],
        tag_list: &[String],
    ) -> Vec<FilterSpec> {
        let mut tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            tokens.push("");
        }

        tokens
            .into_iter()
            .map(|token| {
                let mut definition = FilterDefinition {
                    name: format!("{}{token}", constants::LIVE_FILTER_PREFIX),
                    level: min_level,
                    ..Default::default()
                };
                if let Some(pid) = token.strip_prefix(constants::PID_KEYWORD) {
                    definition.pid = pid.to_string();
                } else if let Some(tid) = token.strip_prefix(constants::TID_KEYWORD) {
                    definition.tid = tid.to_string();
                } else if let Some(tag) = token.strip_prefix(constants::TAG_KEYWORD) {
                    definition.tag = tag.to_string();
                } else if let Some(text) = token.strip_prefix(constants::TEXT_KEYWORD) {
                    definition.text = text.to_string();
                } else {
                    definition.text = token.to_string();
                }

                let mut spec = FilterSpec::new(definition);
                spec.set_aux_lists(pid_list.to_vec(), tag_list.to_vec());
                spec
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &FilterDefinition {
        &self.definition
    }

    pub fn level(&self) -> Severity {
        self.definition.level
    }

    /// True if the tag condition is in effect (set and valid).
    pub fn has_tag_condition(&self) -> bool {
        self.tag_regex.is_some()
    }

    /// True if the text condition is in effect (set and valid).
    pub fn has_text_condition(&self) -> bool {
        self.text_regex.is_some()
    }

    /// Replace the auxiliary show/hide pid and tag selections.
    pub fn set_aux_lists(&mut self, pid_list: Vec<String>, tag_list: Vec<String>) {
        self.pid_list = pid_list;
        self.tag_list = tag_list;
    }

    /// Check a record against every condition, cheapest first.
    pub fn matches(&self, record: &LogRecord) -> bool {
        let def = &self.definition;

        if record.severity < def.level {
            return false;
        }
        if !def.pid.is_empty() && record.pid != def.pid {
            return false;
        }
        if !def.tid.is_empty() && record.tid != def.tid {
            return false;
        }

        if let Some(ref re) = self.tag_regex {
            if !re.is_match(&record.tag) {
                return false;
            }
        }
        if let Some(ref re) = self.text_regex {
            if !re.is_match(&record.message) {
                return false;
            }
        }

        if aux_list_rejects(&self.pid_list, &record.pid) {
            return false;
        }
        if aux_list_rejects(&self.tag_list, &record.tag) {
            return false;
        }

        if def.pid_hide_list.iter().any(|pid| *pid == record.pid) {
            return false;
        }
        if !self.tag_show_set.is_empty() && !self.tag_show_set.contains(&record.tag) {
            return false;
        }

        true
    }

    /// Add the number of matching records in `new_records` to the unread count.
    pub fn update_unread_count(&mut self, new_records: &[LogRecord]) {
        self.unread_count += new_records.iter().filter(|r| self.matches(r)).count();
    }

    pub fn reset_unread_count(&mut self) {
        self.unread_count = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }
}

fn lenient_pattern(filter: &str, field: &'static str, pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match compile_pattern(field, pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(filter = %filter, error = %e, "Ignoring invalid filter regex");
            None
        }
    }
}

/// Whether an auxiliary selection list excludes `value`.
///
/// `["show", a, b]` admits only a and b; `["hide", a, b]` rejects them.
/// A list without a keyword acts as a hide list over all of its elements.
fn aux_list_rejects(list: &[String], value: &str) -> bool {
    let Some((first, rest)) = list.split_first() else {
        return false;
    };
    match first.as_str() {
        constants::SHOW_KEYWORD => !rest.iter().any(|v| v == value),
        constants::HIDE_KEYWORD => rest.iter().any(|v| v == value),
        _ => list.iter().any(|v| v == value),
    }
}

/// Indices of the records accepted by every filter in `specs`.
///
/// An empty filter list accepts everything.
pub fn apply_filters(records: &[LogRecord], specs: &[FilterSpec]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| specs.iter().all(|spec| spec.matches(record)))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(severity: Severity, pid: &str, tag: &str, message: &str) -> LogRecord {
        LogRecord::new(severity, pid, "1", tag, "04-08 12:57:40.370", message).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn spec(definition: FilterDefinition) -> FilterSpec {
        FilterSpec::new(definition)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let f = spec(FilterDefinition::named("all"));
        assert!(f.matches(&make_record(Severity::Verbose, "1", "A", "x")));
        assert!(f.matches(&make_record(Severity::Assert, "2", "B", "y")));
    }

    #[test]
    fn test_severity_and_pid_must_both_hold() {
        let f = spec(FilterDefinition {
            pid: "100".to_string(),
            level: Severity::Warn,
            ..Default::default()
        });
        assert!(f.matches(&make_record(Severity::Error, "100", "T", "m")));
        assert!(!f.matches(&make_record(Severity::Info, "100", "T", "m")));
        assert!(!f.matches(&make_record(Severity::Error, "101", "T", "m")));
    }

    #[test]
    fn test_tid_condition() {
        let f = spec(FilterDefinition {
            tid: "7".to_string(),
            ..Default::default()
        });
        let mut r = make_record(Severity::Info, "1", "T", "m");
        assert!(!f.matches(&r));
        r.tid = "7".to_string();
        assert!(f.matches(&r));
    }

    #[test]
    fn test_lowercase_pattern_is_case_insensitive() {
        let f = spec(FilterDefinition {
            tag: "activity".to_string(),
            ..Default::default()
        });
        assert!(f.matches(&make_record(Severity::Info, "1", "ActivityManager", "m")));
    }

    #[test]
    fn test_uppercase_pattern_is_case_sensitive() {
        let f = spec(FilterDefinition {
            tag: "Activity".to_string(),
            ..Default::default()
        });
        assert!(!f.matches(&make_record(Severity::Info, "1", "activitymanager", "m")));
        assert!(f.matches(&make_record(Severity::Info, "1", "MyActivity", "m")));
    }

    #[test]
    fn test_text_regex_is_a_search() {
        let f = spec(FilterDefinition {
            text: r"code:\s*5\d{2}".to_string(),
            ..Default::default()
        });
        assert!(f.matches(&make_record(Severity::Info, "1", "T", "Error code: 503 returned")));
        assert!(!f.matches(&make_record(Severity::Info, "1", "T", "Error code: 404")));
    }

    #[test]
    fn test_invalid_regex_disables_condition() {
        let f = spec(FilterDefinition {
            text: "[unclosed".to_string(),
            ..Default::default()
        });
        assert!(!f.has_text_condition());
        assert!(f.matches(&make_record(Severity::Info, "1", "T", "anything")));
        assert!(compile_pattern("text", "[unclosed").is_err());
    }

    #[test]
    fn test_invalid_tag_regex_disables_condition() {
        let f = spec(FilterDefinition {
            tag: "(".to_string(),
            text: "boot".to_string(),
            ..Default::default()
        });
        assert!(!f.has_tag_condition());
        assert!(f.has_text_condition());
        // Only the text condition is left.
        assert!(f.matches(&make_record(Severity::Info, "1", "AnyTag", "boot done")));
        assert!(!f.matches(&make_record(Severity::Info, "1", "AnyTag", "idle")));
        assert!(matches!(
            compile_pattern("tag", "("),
            Err(FilterError::InvalidRegex { field: "tag", .. })
        ));
    }

    #[test]
    fn test_aux_show_list() {
        let mut f = spec(FilterDefinition::named("f"));
        f.set_aux_lists(strings(&["show", "10", "20"]), Vec::new());
        assert!(f.matches(&make_record(Severity::Info, "10", "T", "m")));
        assert!(f.matches(&make_record(Severity::Info, "20", "T", "m")));
        assert!(!f.matches(&make_record(Severity::Info, "30", "T", "m")));
    }

    #[test]
    fn test_aux_hide_list() {
        let mut f = spec(FilterDefinition::named("f"));
        f.set_aux_lists(Vec::new(), strings(&["hide", "Noisy"]));
        assert!(!f.matches(&make_record(Severity::Info, "1", "Noisy", "m")));
        assert!(f.matches(&make_record(Severity::Info, "1", "Quiet", "m")));
    }

    #[test]
    fn test_aux_keyword_is_not_a_value() {
        // A record whose tag is literally "show" is not admitted by the keyword.
        let mut f = spec(FilterDefinition::named("f"));
        f.set_aux_lists(Vec::new(), strings(&["show", "A"]));
        assert!(!f.matches(&make_record(Severity::Info, "1", "show", "m")));
    }

    #[test]
    fn test_persisted_hide_and_show_lists() {
        let f = spec(FilterDefinition {
            pid_hide_list: strings(&["5"]),
            tag_show_list: strings(&["Keep", "AlsoKeep"]),
            ..Default::default()
        });
        assert!(f.matches(&make_record(Severity::Info, "1", "Keep", "m")));
        assert!(!f.matches(&make_record(Severity::Info, "5", "Keep", "m")));
        assert!(!f.matches(&make_record(Severity::Info, "1", "Other", "m")));
    }

    #[test]
    fn test_from_query_classifies_tokens() {
        let specs = FilterSpec::from_query(
            "pid:42 tid:43 tag:net text:fail boom",
            Severity::Debug,
            &[],
            &[],
        );
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[0].definition().pid, "42");
        assert_eq!(specs[1].definition().tid, "43");
        assert_eq!(specs[2].definition().tag, "net");
        assert_eq!(specs[3].definition().text, "fail");
        assert_eq!(specs[4].definition().text, "boom");
        assert_eq!(specs[4].name(), "livefilter-boom");
        assert!(specs.iter().all(|s| s.level() == Severity::Debug));
    }

    #[test]
    fn test_empty_query_keeps_level_and_aux_lists() {
        let specs = FilterSpec::from_query("   ", Severity::Warn, &strings(&["hide", "9"]), &[]);
        assert_eq!(specs.len(), 1);
        assert!(!specs[0].has_tag_condition() && !specs[0].has_text_condition());
        assert!(!specs[0].matches(&make_record(Severity::Info, "1", "T", "m")));
        assert!(!specs[0].matches(&make_record(Severity::Error, "9", "T", "m")));
        assert!(specs[0].matches(&make_record(Severity::Error, "1", "T", "m")));
    }

    #[test]
    fn test_apply_filters_is_conjunctive() {
        let records = vec![
            make_record(Severity::Error, "1", "net", "connection failed"),
            make_record(Severity::Error, "1", "net", "connected"),
            make_record(Severity::Info, "1", "db", "query failed"),
        ];
        let specs = FilterSpec::from_query("tag:net fail", Severity::Verbose, &[], &[]);
        assert_eq!(apply_filters(&records, &specs), vec![0]);
        assert_eq!(apply_filters(&records, &[]), vec![0, 1, 2]);
    }

    #[test]
    fn test_unread_count_accumulates_over_batches() {
        let mut f = spec(FilterDefinition {
            level: Severity::Error,
            ..Default::default()
        });
        let first = vec![
            make_record(Severity::Error, "1", "T", "a"),
            make_record(Severity::Info, "1", "T", "b"),
        ];
        let second = vec![
            make_record(Severity::Assert, "1", "T", "c"),
            make_record(Severity::Error, "1", "T", "d"),
        ];
        f.update_unread_count(&first);
        assert_eq!(f.unread_count(), 1);
        f.update_unread_count(&second);
        assert_eq!(f.unread_count(), 3);
        f.reset_unread_count();
        assert_eq!(f.unread_count(), 0);
    }

    #[test]
    fn test_definition_fields_are_trimmed() {
        let f = spec(FilterDefinition {
            name: "  spaced  ".to_string(),
            pid: " 12 ".to_string(),
            ..Default::default()
        });
        assert_eq!(f.name(), "spaced");
        assert!(f.matches(&make_record(Severity::Info, "12", "T", "m")));
    }
}
