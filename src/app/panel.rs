// LogcatView - app/panel.rs
//
// Headless state of one channel's log view: the records last delivered for
// the channel, its saved filters with unread counts, and the live query.
//
// A panel is driven by record batches (usually received through an mpsc
// listener) and answers "what is visible now" for whatever renders it.

use crate::core::filter::{FilterDefinition, FilterSpec};
use crate::core::model::{Channel, LogRecord, RecordBatch, Severity, SourceFile};
use crate::core::sync;
use crate::util::constants;
use std::collections::BTreeSet;

/// View state for a single channel.
#[derive(Debug, Clone)]
pub struct LogPanel {
    channel: Channel,
    file: Option<SourceFile>,
    records: Vec<LogRecord>,

    /// Saved filters. Index 0 is always the built-in match-everything filter.
    filters: Vec<FilterSpec>,
    selected: usize,

    live_query: String,
    min_level: Severity,
    pid_selection: Vec<String>,
    tag_selection: Vec<String>,
    live_specs: Vec<FilterSpec>,
}

impl LogPanel {
    pub fn new(channel: Channel) -> Self {
        let mut panel = Self {
            channel,
            file: None,
            records: Vec::new(),
            filters: vec![FilterSpec::new(FilterDefinition::named(
                constants::DEFAULT_FILTER_NAME,
            ))],
            selected: 0,
            live_query: String::new(),
            min_level: Severity::Verbose,
            pid_selection: Vec::new(),
            tag_selection: Vec::new(),
            live_specs: Vec::new(),
        };
        panel.rebuild_live_specs();
        panel
    }

    /// A panel with preset filters after the built-in one.
    pub fn with_filters(channel: Channel, presets: &[FilterDefinition]) -> Self {
        let mut panel = Self::new(channel);
        for preset in presets {
            panel.add_filter(preset.clone());
        }
        panel
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The file the current records came from.
    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    // -------------------------------------------------------------------------
    // Record delivery
    // -------------------------------------------------------------------------

    /// Replace the panel's records with a newly loaded file's records.
    ///
    /// Every filter except the selected one counts the new matches as unread.
    pub fn receive(&mut self, records: Vec<LogRecord>, file: SourceFile) {
        for (idx, filter) in self.filters.iter_mut().enumerate() {
            if idx != self.selected {
                filter.update_unread_count(&records);
            }
        }
        tracing::debug!(
            channel = %self.channel,
            file = %file.name,
            records = records.len(),
            "Panel received records"
        );
        self.records = records;
        self.file = Some(file);
    }

    /// Accept a batch if it belongs to this panel's channel.
    pub fn receive_batch(&mut self, batch: RecordBatch) -> bool {
        if batch.channel != self.channel {
            return false;
        }
        self.receive(batch.records, batch.file);
        true
    }

    /// Distinct pids in the current records, for building show/hide selections.
    pub fn known_pids(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.pid.as_str()))
    }

    /// Distinct tags in the current records.
    pub fn known_tags(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.tag.as_str()))
    }

    // -------------------------------------------------------------------------
    // Saved filters
    // -------------------------------------------------------------------------

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn selected_filter_index(&self) -> usize {
        self.selected
    }

    pub fn selected_filter(&self) -> &FilterSpec {
        &self.filters[self.selected]
    }

    /// Append a filter and return its index.
    pub fn add_filter(&mut self, definition: FilterDefinition) -> usize {
        self.filters.push(FilterSpec::new(definition));
        self.filters.len() - 1
    }

    /// Remove a saved filter. The built-in filter cannot be removed; if the
    /// selected filter goes away the built-in one becomes selected.
    pub fn remove_filter(&mut self, idx: usize) -> bool {
        if idx == 0 || idx >= self.filters.len() {
            return false;
        }
        self.filters.remove(idx);
        if self.selected == idx {
            self.select_filter(0);
        } else if self.selected > idx {
            self.selected -= 1;
        }
        true
    }

    /// Make `idx` the active filter and clear its unread count.
    pub fn select_filter(&mut self, idx: usize) -> bool {
        let Some(filter) = self.filters.get_mut(idx) else {
            return false;
        };
        filter.reset_unread_count();
        self.selected = idx;
        true
    }

    // -------------------------------------------------------------------------
    // Live query
    // -------------------------------------------------------------------------

    pub fn live_query(&self) -> &str {
        &self.live_query
    }

    pub fn min_level(&self) -> Severity {
        self.min_level
    }

    pub fn set_live_query(&mut self, query: &str) {
        self.live_query = query.to_string();
        self.rebuild_live_specs();
    }

    pub fn set_min_level(&mut self, level: Severity) {
        self.min_level = level;
        self.rebuild_live_specs();
    }

    /// Show or hide records by pid: `["show", pid...]` or `["hide", pid...]`.
    /// An empty list clears the selection.
    pub fn set_pid_selection(&mut self, list: Vec<String>) {
        self.pid_selection = list;
        self.rebuild_live_specs();
    }

    /// Show or hide records by tag, same shape as the pid selection.
    pub fn set_tag_selection(&mut self, list: Vec<String>) {
        self.tag_selection = list;
        self.rebuild_live_specs();
    }

    fn rebuild_live_specs(&mut self) {
        self.live_specs = FilterSpec::from_query(
            &self.live_query,
            self.min_level,
            &self.pid_selection,
            &self.tag_selection,
        );
    }

    // -------------------------------------------------------------------------
    // Visible view
    // -------------------------------------------------------------------------

    fn is_visible(&self, record: &LogRecord) -> bool {
        self.filters[self.selected].matches(record)
            && self.live_specs.iter().all(|spec| spec.matches(record))
    }

    /// Indices into `records()` accepted by the selected filter and the live
    /// query.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.is_visible(r))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn visible_records(&self) -> Vec<&LogRecord> {
        self.records.iter().filter(|r| self.is_visible(r)).collect()
    }

    /// Position within `visible_records()` closest to `time`.
    pub fn sync_to(&self, time: &str) -> Option<usize> {
        let visible = self.visible_records();
        let idx = sync::nearest_record_index(&visible, time);
        tracing::debug!(channel = %self.channel, time, index = ?idx, "Synced to time");
        idx
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
