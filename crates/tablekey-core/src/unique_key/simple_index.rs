//! Index for unique keys without two-column range items.

use rustc_hash::FxHashMap;

use super::definition::ResolvedKey;
use super::fingerprint::{KeyFingerprint, KeyValue};
use super::slot::RowSlot;
use super::validator::ValidatorStats;
use super::violations::ViolationCollector;
use crate::message::MessageList;
use crate::table::{RowId, TableRows};

/// Fingerprint → row or collision set, for one unique key.
#[derive(Debug)]
pub(crate) struct SimpleKeyIndex {
    key: ResolvedKey,
    buckets: FxHashMap<KeyValue, RowSlot>,
}

impl SimpleKeyIndex {
    pub(crate) fn new(key: ResolvedKey) -> Self {
        Self {
            key,
            buckets: FxHashMap::default(),
        }
    }

    pub(crate) fn key(&self) -> &ResolvedKey {
        &self.key
    }

    /// Files `row` under its current fingerprint.
    pub(crate) fn on_row_changed(&mut self, rows: &TableRows, row: RowId) {
        let Some(fingerprint) = KeyValue::compute(&self.key, rows, row) else {
            return;
        };
        let previous = self.buckets.remove(&fingerprint);
        self.buckets
            .insert(fingerprint, RowSlot::changed(previous, row));
    }

    /// Takes `row` out of the bucket of its current fingerprint. Called
    /// while the row is still readable.
    pub(crate) fn on_row_removed(&mut self, rows: &TableRows, row: RowId) {
        let Some(fingerprint) = KeyValue::compute(&self.key, rows, row) else {
            return;
        };
        let previous = self.buckets.remove(&fingerprint);
        let key = &self.key;
        let remaining = RowSlot::removed(previous, row, |occupant| {
            fingerprint.with_row(occupant).is_valid(key, rows)
        });
        if let Some(slot) = remaining {
            self.buckets.insert(fingerprint, slot);
        }
    }

    /// Drops stale occupants, then reports every row of every collision set.
    pub(crate) fn validate(&mut self, rows: &TableRows, cap: usize, stats: &mut ValidatorStats) -> MessageList {
        let key = &self.key;
        self.buckets.retain(|fingerprint, slot| {
            let before = slot.len();
            let current = std::mem::replace(slot, RowSlot::One(fingerprint.row()));
            let kept = current.retain(|row| fingerprint.with_row(row).is_valid(key, rows));
            let after = kept.as_ref().map_or(0, RowSlot::len);
            stats.pruned_entries += (before - after) as u64;
            match kept {
                Some(kept) => {
                    *slot = kept;
                    true
                }
                None => {
                    tracing::trace!(key = %key.name, value = fingerprint.value(), "Evicting stale bucket");
                    stats.evicted_buckets += 1;
                    false
                }
            }
        });

        let mut collector = ViolationCollector::new(cap);
        'buckets: for slot in self.buckets.values().filter(|slot| slot.is_collision()) {
            for row in slot.rows() {
                if !collector.report(row) {
                    break 'buckets;
                }
            }
        }
        tracing::trace!(
            key = %self.key.name,
            violations = collector.len(),
            overflowed = collector.overflowed(),
            "Validated unique key"
        );
        collector.into_messages(&self.key, rows, false)
    }

    /// Rows filed under a fingerprint value.
    #[cfg(test)]
    pub(crate) fn rows_for(&self, value: &str) -> Option<Vec<RowId>> {
        let probe = KeyValue::new(RowId::new(u64::MAX), value);
        self.buckets.get(&probe).map(|slot| slot.rows().collect())
    }

    #[cfg(test)]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
