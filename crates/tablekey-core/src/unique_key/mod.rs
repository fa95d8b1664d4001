//! Unique key validation.
//!
//! Every unique key of a structure gets one index:
//!
//! - keys with only exact-match items use a hash index from key value to
//!   rows ([`simple_index`]);
//! - keys with two-column range items group rows by the exact-match part and
//!   keep one ordered map per range item ([`range_index`]).
//!
//! # Cache protocol
//!
//! The indexes are built lazily by the first validation pass and then kept
//! current by row events. Entries are never rewritten in place: a changed
//! row is filed under its new value and its old entry goes stale. Stale
//! entries are detected with [`fingerprint::KeyFingerprint::is_valid`] and
//! dropped at the start of each pass, so an event costs a handful of map
//! operations and a pass costs O(rows) instead of a rebuild.
//!
//! Any structure change (stamp or range datatype) drops all caches.

mod definition;
mod fingerprint;
mod interval_tree;
mod range_index;
mod simple_index;
mod slot;
mod validator;
mod violations;

pub use validator::{
    RangeCheck, UniqueKeyValidator, ValidationMode, ValidationOutcome, ValidatorStats,
};
