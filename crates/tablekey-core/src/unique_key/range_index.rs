//! Index for unique keys with two-column range items.
//!
//! ```text
//! RangeKeyIndex
//! └── groups: exact-match fingerprint → RangeGroup
//!     └── items[i]: BTreeMap<KeyValueRange (from), RowSlot>
//! ```
//!
//! Rows only compete when they already agree on the exact-match portion of
//! the key, so overlap detection runs per group. Each range item keeps its
//! own map ordered by from value. A sweep over the first item keeps the
//! intervals that are still open; on compound keys those are also filed in
//! an [`IntervalTree`] by their second item, so the sweep only meets pairs
//! overlapping in both. Candidates must then overlap in every other item
//! too.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use super::definition::{ResolvedKey, ResolvedRange};
use super::fingerprint::{KeyFingerprint, KeyValue, KeyValueRange};
use super::interval_tree::IntervalTree;
use super::slot::RowSlot;
use super::validator::ValidatorStats;
use super::violations::ViolationCollector;
use crate::datatype::ParsedValue;
use crate::message::MessageList;
use crate::table::{RowId, TableRows};

/// Per-item ordered maps of one exact-match group.
#[derive(Debug)]
struct RangeGroup {
    items: Vec<BTreeMap<KeyValueRange, RowSlot>>,
}

impl RangeGroup {
    fn new(item_count: usize) -> Self {
        Self {
            items: (0..item_count).map(|_| BTreeMap::new()).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.items.iter().all(BTreeMap::is_empty)
    }
}

/// A row of the first range item, in sweep order.
#[derive(Debug)]
struct SweepEntry {
    row: RowId,
    from: ParsedValue,
    to: ParsedValue,
    /// Interval in the second range item of a compound key.
    second: Option<(ParsedValue, ParsedValue)>,
}

/// Rows of the first range item in from order. On compound keys, rows
/// without a valid interval in the second item are left out since they
/// cannot collide.
fn sweep_entries(
    map: &BTreeMap<KeyValueRange, RowSlot>,
    primary: &ResolvedRange,
    second: Option<&ResolvedRange>,
    rows: &TableRows,
) -> Vec<SweepEntry> {
    let mut entries = Vec::new();
    for (fingerprint, slot) in map {
        for row in slot.rows() {
            let Some(to) = fingerprint.with_row(row).value_to(primary, rows) else {
                continue;
            };
            let second = match second {
                Some(range) => match range.interval_of(rows, row) {
                    Some(interval) => Some(interval),
                    None => continue,
                },
                None => None,
            };
            entries.push(SweepEntry {
                row,
                from: fingerprint.value_from().clone(),
                to,
                second,
            });
        }
    }
    entries
}

/// Intervals of the first range item still open at the sweep position.
///
/// On compound keys the open intervals are also filed by their second item,
/// so a new entry only meets rows it overlaps in both.
struct OpenIntervals<'a> {
    entries: &'a [SweepEntry],
    /// `(to, seq)`; the earliest end expires first.
    by_end: BTreeSet<(&'a ParsedValue, usize)>,
    second: Option<IntervalTree>,
}

impl<'a> OpenIntervals<'a> {
    fn new(entries: &'a [SweepEntry], compound: bool) -> Self {
        let second = compound.then(|| {
            IntervalTree::new(
                entries
                    .iter()
                    .filter_map(|entry| entry.second.as_ref().map(|(from, _)| from.clone()))
                    .collect(),
            )
        });
        Self {
            entries,
            by_end: BTreeSet::new(),
            second,
        }
    }

    /// Closes every interval ending before `from`.
    fn expire_before(&mut self, from: &ParsedValue) {
        while let Some(&(to, seq)) = self.by_end.first() {
            if to >= from {
                break;
            }
            self.by_end.pop_first();
            if let (Some(tree), Some((start, _))) = (&mut self.second, &self.entries[seq].second) {
                tree.remove(start, seq);
            }
        }
    }

    /// Open rows overlapping entry `seq` in the indexed items, oldest first.
    fn candidates(&self, seq: usize) -> Vec<RowId> {
        let mut found: Vec<(usize, RowId)> = match (&self.second, &self.entries[seq].second) {
            (Some(tree), Some((from, to))) => tree.overlapping(from, to),
            (Some(_), None) => Vec::new(),
            (None, _) => self
                .by_end
                .iter()
                .map(|&(_, open)| (open, self.entries[open].row))
                .collect(),
        };
        found.sort_unstable_by_key(|&(open, _)| open);
        found.into_iter().map(|(_, row)| row).collect()
    }

    fn open(&mut self, seq: usize) {
        let entries = self.entries;
        let entry = &entries[seq];
        self.by_end.insert((&entry.to, seq));
        if let (Some(tree), Some((from, to))) = (&mut self.second, &entry.second) {
            tree.insert(from, to.clone(), seq, entry.row);
        }
    }
}

/// Interval overlap, plus a direct hit on equal from values for zero-width
/// ranges.
fn overlaps(a_from: &ParsedValue, a_to: &ParsedValue, b_from: &ParsedValue, b_to: &ParsedValue) -> bool {
    (b_from <= a_to && a_from <= b_to) || a_from == b_from
}

/// Two rows collide in a range item when both have a valid interval there
/// and the intervals overlap.
fn collide_in(range: &ResolvedRange, rows: &TableRows, a: RowId, b: RowId) -> bool {
    match (range.interval_of(rows, a), range.interval_of(rows, b)) {
        (Some((a_from, a_to)), Some((b_from, b_to))) => overlaps(&a_from, &a_to, &b_from, &b_to),
        _ => false,
    }
}

/// Exact-match fingerprint → per range item → from → rows, for one unique key.
#[derive(Debug)]
pub(crate) struct RangeKeyIndex {
    key: ResolvedKey,
    groups: FxHashMap<KeyValue, RangeGroup>,
}

impl RangeKeyIndex {
    pub(crate) fn new(key: ResolvedKey) -> Self {
        debug_assert!(key.is_range_key());
        Self {
            key,
            groups: FxHashMap::default(),
        }
    }

    pub(crate) fn key(&self) -> &ResolvedKey {
        &self.key
    }

    /// Files `row` in its group under every range item it has a valid
    /// interval for.
    pub(crate) fn on_row_changed(&mut self, rows: &TableRows, row: RowId) {
        let Some(group_fingerprint) = KeyValue::compute(&self.key, rows, row) else {
            return;
        };
        let fingerprints: Vec<(usize, KeyValueRange)> = self
            .key
            .ranges
            .iter()
            .enumerate()
            .filter_map(|(i, range)| KeyValueRange::compute(range, rows, row).map(|fp| (i, fp)))
            .collect();
        if fingerprints.is_empty() {
            return;
        }

        let item_count = self.key.ranges.len();
        let group = self
            .groups
            .entry(group_fingerprint)
            .or_insert_with(|| RangeGroup::new(item_count));
        for (i, fingerprint) in fingerprints {
            let map = &mut group.items[i];
            let previous = map.remove(&fingerprint);
            map.insert(fingerprint, RowSlot::changed(previous, row));
        }
    }

    /// Takes `row` out of every item map of its current group. Called while
    /// the row is still readable.
    pub(crate) fn on_row_removed(&mut self, rows: &TableRows, row: RowId) {
        let Some(group_fingerprint) = KeyValue::compute(&self.key, rows, row) else {
            return;
        };
        let key = &self.key;
        let Some(group) = self.groups.get_mut(&group_fingerprint) else {
            return;
        };

        for (range, map) in key.ranges.iter().zip(group.items.iter_mut()) {
            let Some(fingerprint) = KeyValueRange::compute(range, rows, row) else {
                continue;
            };
            let previous = map.remove(&fingerprint);
            let remaining = RowSlot::removed(previous, row, |occupant| {
                group_fingerprint.with_row(occupant).is_valid(key, rows)
                    && fingerprint.with_row(occupant).is_valid(range, rows)
            });
            if let Some(slot) = remaining {
                map.insert(fingerprint, slot);
            }
        }

        if group.is_empty() {
            self.groups.remove(&group_fingerprint);
        }
    }

    /// Drops stale entries, then reports rows whose ranges overlap in every
    /// range item of the key.
    pub(crate) fn validate(&mut self, rows: &TableRows, cap: usize, stats: &mut ValidatorStats) -> MessageList {
        self.evict_stale(rows, stats);

        let Some((primary, others)) = self.key.ranges.split_first() else {
            return MessageList::new();
        };

        let mut collector = ViolationCollector::new(cap);
        'groups: for group in self.groups.values() {
            let entries = sweep_entries(&group.items[0], primary, others.first(), rows);
            let mut open = OpenIntervals::new(&entries, !others.is_empty());

            for (seq, entry) in entries.iter().enumerate() {
                open.expire_before(&entry.from);
                for earlier in open.candidates(seq) {
                    if !others.is_empty() {
                        stats.range_candidates += 1;
                    }
                    if !others
                        .iter()
                        .skip(1)
                        .all(|range| collide_in(range, rows, earlier, entry.row))
                    {
                        continue;
                    }
                    if !collector.report_pair(earlier, entry.row) {
                        break 'groups;
                    }
                }
                open.open(seq);
            }
        }

        tracing::trace!(
            key = %self.key.name,
            violations = collector.len(),
            overflowed = collector.overflowed(),
            "Validated range key"
        );
        collector.into_messages(&self.key, rows, true)
    }

    /// Removes occupants that left their group, changed their from value,
    /// lost a parsable interval, or were deleted. Empty entries and groups go.
    fn evict_stale(&mut self, rows: &TableRows, stats: &mut ValidatorStats) {
        let key = &self.key;
        self.groups.retain(|group_fingerprint, group| {
            for (range, map) in key.ranges.iter().zip(group.items.iter_mut()) {
                map.retain(|fingerprint, slot| {
                    let before = slot.len();
                    let current = std::mem::replace(slot, RowSlot::One(fingerprint.row()));
                    let kept = current.retain(|row| {
                        group_fingerprint.with_row(row).is_valid(key, rows)
                            && fingerprint.with_row(row).is_valid(range, rows)
                    });
                    let after = kept.as_ref().map_or(0, RowSlot::len);
                    stats.pruned_entries += (before - after) as u64;
                    match kept {
                        Some(kept) => {
                            *slot = kept;
                            true
                        }
                        None => {
                            stats.evicted_buckets += 1;
                            false
                        }
                    }
                });
            }
            if group.is_empty() {
                tracing::trace!(key = %key.name, group = group_fingerprint.value(), "Evicting stale range group");
                return false;
            }
            true
        });
    }

    /// Rows filed under a group and a from value of one range item.
    #[cfg(test)]
    pub(crate) fn rows_for(&self, group: &str, item: usize, from: &ParsedValue) -> Option<Vec<RowId>> {
        let group = self.groups.get(&KeyValue::new(RowId::new(u64::MAX), group))?;
        group.items[item]
            .iter()
            .find(|(fingerprint, _)| fingerprint.value_from() == from)
            .map(|(_, slot)| slot.rows().collect())
    }

    #[cfg(test)]
    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }
}
