//! Overlap queries over intervals whose starts are known up front.
//!
//! The tree is a flat segment tree over the ranks of the declared starts.
//! Each node keeps the largest end filed below it, so a query skips every
//! subtree whose intervals all end before the query interval begins.
//!
//! | Operation     | Cost                     |
//! |---------------|--------------------------|
//! | `insert`      | O(log n)                 |
//! | `remove`      | O(log n + rows at start) |
//! | `overlapping` | O((k + 1) log n)         |

use crate::datatype::ParsedValue;
use crate::table::RowId;

#[derive(Debug)]
struct Filed {
    end: ParsedValue,
    seq: usize,
    row: RowId,
}

/// Intervals filed by the rank of their start.
#[derive(Debug)]
pub(crate) struct IntervalTree {
    starts: Vec<ParsedValue>,
    leaves: Vec<Vec<Filed>>,
    /// Largest end per node, heap layout rooted at 1.
    max_end: Vec<Option<ParsedValue>>,
    width: usize,
}

impl IntervalTree {
    /// Builds an empty tree accepting the given starts. Duplicates merge.
    pub(crate) fn new(mut starts: Vec<ParsedValue>) -> Self {
        starts.sort();
        starts.dedup();
        let width = starts.len().next_power_of_two();
        Self {
            leaves: (0..starts.len()).map(|_| Vec::new()).collect(),
            max_end: vec![None; 2 * width],
            starts,
            width,
        }
    }

    /// Files `[start, end]` under sequence number `seq`. Returns false when
    /// `start` was not declared at construction.
    pub(crate) fn insert(&mut self, start: &ParsedValue, end: ParsedValue, seq: usize, row: RowId) -> bool {
        let Ok(rank) = self.starts.binary_search(start) else {
            return false;
        };
        self.leaves[rank].push(Filed { end, seq, row });
        self.refresh(rank);
        true
    }

    /// Removes the interval filed under `start` and `seq`, if any.
    pub(crate) fn remove(&mut self, start: &ParsedValue, seq: usize) {
        let Ok(rank) = self.starts.binary_search(start) else {
            return;
        };
        self.leaves[rank].retain(|filed| filed.seq != seq);
        self.refresh(rank);
    }

    /// `(seq, row)` of every filed interval overlapping `[from, to]`, in no
    /// particular order.
    pub(crate) fn overlapping(&self, from: &ParsedValue, to: &ParsedValue) -> Vec<(usize, RowId)> {
        let limit = self.starts.partition_point(|start| start <= to);
        let mut found = Vec::new();
        if limit > 0 {
            self.collect(1, 0, self.width, limit, from, &mut found);
        }
        found
    }

    fn collect(
        &self,
        node: usize,
        lo: usize,
        hi: usize,
        limit: usize,
        from: &ParsedValue,
        found: &mut Vec<(usize, RowId)>,
    ) {
        if lo >= limit {
            return;
        }
        match &self.max_end[node] {
            Some(max) if max >= from => {}
            _ => return,
        }
        if hi - lo == 1 {
            found.extend(
                self.leaves[lo]
                    .iter()
                    .filter(|filed| filed.end >= *from)
                    .map(|filed| (filed.seq, filed.row)),
            );
            return;
        }
        let mid = (lo + hi) / 2;
        self.collect(2 * node, lo, mid, limit, from, found);
        self.collect(2 * node + 1, mid, hi, limit, from, found);
    }

    fn refresh(&mut self, rank: usize) {
        let mut node = self.width + rank;
        self.max_end[node] = self.leaves[rank].iter().map(|filed| &filed.end).max().cloned();
        while node > 1 {
            node /= 2;
            self.max_end[node] = self.max_end[2 * node]
                .as_ref()
                .max(self.max_end[2 * node + 1].as_ref())
                .cloned();
        }
    }

    /// Number of filed intervals.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.leaves.iter().map(Vec::len).sum()
    }
}
