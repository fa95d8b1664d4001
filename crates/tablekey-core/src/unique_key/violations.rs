//! Capped collection of violating rows for one unique key.

use indexmap::IndexSet;

use super::definition::ResolvedKey;
use crate::message::{Message, MessageList};
use crate::table::{RowId, TableRows};

/// Collects distinct violating rows until the cap is exceeded.
#[derive(Debug)]
pub(crate) struct ViolationCollector {
    cap: usize,
    rows: IndexSet<RowId>,
    overflowed: bool,
}

impl ViolationCollector {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap,
            rows: IndexSet::new(),
            overflowed: false,
        }
    }

    /// Records a violating row. Returns false once a row beyond the cap was
    /// found; the caller stops searching.
    pub(crate) fn report(&mut self, row: RowId) -> bool {
        if self.rows.contains(&row) {
            return true;
        }
        if self.rows.len() >= self.cap {
            self.overflowed = true;
            return false;
        }
        self.rows.insert(row);
        true
    }

    /// Records both rows of a colliding pair.
    pub(crate) fn report_pair(&mut self, a: RowId, b: RowId) -> bool {
        self.report(a) && self.report(b)
    }

    /// Number of distinct rows recorded.
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if violations beyond the cap were found.
    pub(crate) fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// One message per recorded row in table order, followed by the summary
    /// if the cap was exceeded.
    pub(crate) fn into_messages(self, key: &ResolvedKey, rows: &TableRows, overlapping: bool) -> MessageList {
        let mut located: Vec<(usize, RowId)> = self
            .rows
            .iter()
            .filter_map(|row| rows.index_of(*row).map(|index| (index, *row)))
            .collect();
        located.sort_unstable();

        let mut messages: MessageList = located
            .into_iter()
            .map(|(index, row)| {
                Message::unique_key_violation(&key.name, row, index, key.columns.clone(), overlapping)
            })
            .collect();
        if self.overflowed {
            messages.add(Message::too_many_violations(
                &key.name,
                key.columns.clone(),
                self.cap,
            ));
        }
        messages
    }
}
