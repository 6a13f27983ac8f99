// LogcatView - app/events.rs
//
// Listener interfaces for delivering parsed records and sync-time
// selections, plus the hub that fans a selected time out to every panel.
//
// Listeners are handed to the producers that call them (`LogLoader::new`,
// `SyncHub::add_listener`); there is no process-wide registry.
//
// `mpsc::Sender` implements both traits so a consumer on another thread can
// simply poll a receiver.

use crate::core::model::{Channel, LogRecord, RecordBatch, SourceFile};
use std::sync::mpsc;

/// Receives the records parsed from one file for one channel.
pub trait RecordListener {
    fn on_records_received(&self, records: &[LogRecord], channel: Channel, file: &SourceFile);
}

impl RecordListener for mpsc::Sender<RecordBatch> {
    fn on_records_received(&self, records: &[LogRecord], channel: Channel, file: &SourceFile) {
        let batch = RecordBatch {
            channel,
            file: file.clone(),
            records: records.to_vec(),
        };
        if self.send(batch).is_err() {
            tracing::debug!(channel = %channel, "Record receiver dropped; batch discarded");
        }
    }
}

/// Receives a timestamp (`MM-DD HH:MM:SS.fff`) selected in another panel.
pub trait SyncListener {
    fn on_sync_time_selected(&self, time: &str);
}

impl SyncListener for mpsc::Sender<String> {
    fn on_sync_time_selected(&self, time: &str) {
        if self.send(time.to_string()).is_err() {
            tracing::debug!(time, "Sync receiver dropped");
        }
    }
}

/// Handle returned by [`SyncHub::add_listener`], used to exclude the
/// publishing panel from its own broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Fans a selected time out to every registered listener except the one
/// that published it.
#[derive(Default)]
pub struct SyncHub {
    listeners: Vec<(ListenerId, Box<dyn SyncListener>)>,
    next_id: usize,
}

impl SyncHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn SyncListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `time` to every listener other than `origin`.
    /// Returns the number of listeners notified.
    pub fn publish(&self, origin: Option<ListenerId>, time: &str) -> usize {
        let mut notified = 0;
        for (id, listener) in &self.listeners {
            if Some(*id) == origin {
                continue;
            }
            listener.on_sync_time_selected(time);
            notified += 1;
        }
        tracing::debug!(time, notified, "Sync time published");
        notified
    }
}
