use std::cmp::Reverse;

use crate::domain::ClosureRecord;

/// Number of closures shown in the history view unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Most recent closures first, at most `limit`. Stored order is untouched.
pub fn recent(records: &[ClosureRecord], limit: usize) -> Vec<&ClosureRecord> {
    let mut view: Vec<&ClosureRecord> = records.iter().collect();
    view.sort_by_key(|record| Reverse(record.timestamp));
    view.truncate(limit);
    view
}
