// LogcatView - core/sync.rs
//
// Locating a timestamp inside a channel's visible records, used when another
// panel selects a time and every other panel scrolls to the same moment.

use crate::core::model::LogRecord;
use std::borrow::Borrow;

/// Binary search `records` (ordered by time) for `time`.
///
/// Times are compared as strings, which orders `MM-DD HH:MM:SS.fff` values
/// correctly. Returns the index of an exact match, otherwise the last index
/// probed, which is a neighbour of where `time` would sit. `None` only for
/// an empty slice. Accepts owned records or references, so a filtered
/// view can be searched without cloning.
pub fn nearest_record_index<R: Borrow<LogRecord>>(records: &[R], time: &str) -> Option<usize> {
    if records.is_empty() {
        return None;
    }

    // `high` is exclusive so the bounds never go below zero.
    let mut low = 0;
    let mut high = records.len();
    let mut mid = (records.len() - 1) / 2;

    while low < high {
        mid = low + (high - low - 1) / 2;
        match time.cmp(records[mid].borrow().time.as_str()) {
            std::cmp::Ordering::Less => high = mid,
            std::cmp::Ordering::Greater => low = mid + 1,
            std::cmp::Ordering::Equal => break,
        }
    }

    Some(mid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Severity;

    fn at(time: &str) -> LogRecord {
        LogRecord::new(Severity::Info, "1", "2", "T", time, "m").unwrap()
    }

    fn timeline() -> Vec<LogRecord> {
        [
            "04-08 12:00:00.000",
            "04-08 12:00:01.000",
            "04-08 12:00:02.000",
            "04-08 12:00:03.000",
            "04-08 12:00:04.000",
        ]
        .iter()
        .map(|t| at(t))
        .collect()
    }

    #[test]
    fn test_exact_match() {
        let records = timeline();
        for (idx, r) in records.iter().enumerate() {
            assert_eq!(nearest_record_index(&records, &r.time), Some(idx));
        }
    }

    #[test]
    fn test_between_records_lands_on_a_neighbour() {
        let records = timeline();
        let idx = nearest_record_index(&records, "04-08 12:00:02.500").unwrap();
        assert!(idx == 2 || idx == 3);
    }

    #[test]
    fn test_out_of_range_clamps_to_ends() {
        let records = timeline();
        assert_eq!(nearest_record_index(&records, "01-01 00:00:00.000"), Some(0));
        assert_eq!(nearest_record_index(&records, "12-31 23:59:59.999"), Some(4));
    }

    #[test]
    fn test_empty_records() {
        let empty: Vec<LogRecord> = Vec::new();
        assert_eq!(nearest_record_index(&empty, "04-08 12:00:00.000"), None);
    }
}
