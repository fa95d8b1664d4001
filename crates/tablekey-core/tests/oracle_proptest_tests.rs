//! Property tests: the incremental validator must agree with a brute-force
//! check of every row pair after any sequence of edits.

use std::collections::BTreeSet;

use proptest::prelude::*;
use tablekey_core::{
    ColumnRange, KeyItem, RangeCheck, RowId, Structure, TableContents, UniqueKey,
    ValidationConfig,
};

const CODE: usize = 0;
const FROM: usize = 1;
const TO: usize = 2;

#[derive(Debug, Clone)]
enum Op {
    Push(String, String, String),
    Set(usize, usize, String),
    Null(usize, usize),
    Remove(usize),
    Validate,
}

fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(""), Just("A"), Just("B"), Just("C")].prop_map(|s| s.to_string())
}

fn bound_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        1 => Just("x".to_string()),
        8 => (0i64..12).prop_map(|v| v.to_string()),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (code_strategy(), bound_strategy(), bound_strategy())
            .prop_map(|(c, f, t)| Op::Push(c, f, t)),
        2 => (any::<usize>(), Just(CODE), code_strategy()).prop_map(|(r, c, v)| Op::Set(r, c, v)),
        3 => (any::<usize>(), FROM..=TO, bound_strategy()).prop_map(|(r, c, v)| Op::Set(r, c, v)),
        1 => (any::<usize>(), 0usize..3).prop_map(|(r, c)| Op::Null(r, c)),
        1 => any::<usize>().prop_map(Op::Remove),
        2 => Just(Op::Validate),
    ]
}

fn table() -> TableContents {
    let structure = Structure::new("tariffs")
        .with_column("code", "String")
        .with_column("validFrom", "Integer")
        .with_column("validTo", "Integer")
        .with_unique_key(UniqueKey::new("code", vec![KeyItem::column("code")]))
        .with_unique_key(UniqueKey::new(
            "validity",
            vec![
                KeyItem::column("code"),
                KeyItem::range(ColumnRange::two_column("period", "validFrom", "validTo")),
            ],
        ));
    let config = ValidationConfig {
        violation_cap: 1_000,
        ..ValidationConfig::default()
    };
    TableContents::with_config("tariffs", structure, config)
}

struct Snapshot {
    id: RowId,
    code: String,
    interval: Option<(i64, i64)>,
}

fn snapshot(table: &TableContents) -> Vec<Snapshot> {
    table
        .rows()
        .iter()
        .map(|row| {
            let from = row.value(FROM).trim().parse::<i64>().ok();
            let to = row.value(TO).trim().parse::<i64>().ok();
            let interval = match (from, to) {
                (Some(f), Some(t)) if f <= t => Some((f, t)),
                _ => None,
            };
            Snapshot {
                id: row.id(),
                code: row.value(CODE).to_string(),
                interval,
            }
        })
        .collect()
}

fn expected_duplicates(rows: &[Snapshot]) -> BTreeSet<RowId> {
    let mut out = BTreeSet::new();
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            if !a.code.is_empty() && a.code == b.code {
                out.extend([a.id, b.id]);
            }
        }
    }
    out
}

fn expected_overlaps(rows: &[Snapshot]) -> BTreeSet<RowId> {
    let mut out = BTreeSet::new();
    for (i, a) in rows.iter().enumerate() {
        for b in &rows[i + 1..] {
            if a.code.is_empty() || a.code != b.code {
                continue;
            }
            if let (Some((af, at)), Some((bf, bt))) = (a.interval, b.interval) {
                if bf <= at && af <= bt {
                    out.extend([a.id, b.id]);
                }
            }
        }
    }
    out
}

fn check(table: &mut TableContents) -> Result<(), TestCaseError> {
    let outcome = table.validate();
    prop_assert_eq!(outcome.range_check, RangeCheck::Performed);

    let rows = snapshot(table);
    let reported = |key: &str| -> BTreeSet<RowId> {
        outcome
            .messages
            .for_unique_key(key)
            .filter_map(|m| m.row)
            .collect()
    };
    prop_assert_eq!(reported("code"), expected_duplicates(&rows));
    prop_assert_eq!(reported("validity"), expected_overlaps(&rows));
    Ok(())
}

/// Three range items over small integer bounds; `(from, to)` per item.
type Boxed = [(i64, i64); 3];

fn boxed_strategy() -> impl Strategy<Value = Boxed> {
    proptest::array::uniform3((0i64..20, 0i64..6).prop_map(|(from, width)| (from, from + width)))
}

fn compound_table(rows: &[Boxed]) -> TableContents {
    let mut structure = Structure::new("boxes").with_column("code", "String");
    let mut items = vec![KeyItem::column("code")];
    for dim in 0..3 {
        let (from, to) = (format!("from{dim}"), format!("to{dim}"));
        structure = structure
            .with_column(from.as_str(), "Integer")
            .with_column(to.as_str(), "Integer");
        items.push(KeyItem::range(ColumnRange::two_column(format!("dim{dim}"), from, to)));
    }
    let structure = structure.with_unique_key(UniqueKey::new("boxes", items));
    let config = ValidationConfig {
        violation_cap: 1_000,
        ..ValidationConfig::default()
    };
    let mut table = TableContents::with_config("boxes", structure, config);
    for intervals in rows {
        let mut values = vec![Some("A".to_string())];
        for (from, to) in intervals {
            values.push(Some(from.to_string()));
            values.push(Some(to.to_string()));
        }
        table.push_row(values).unwrap();
    }
    table
}

fn expected_box_overlaps(ids: &[RowId], rows: &[Boxed]) -> BTreeSet<RowId> {
    let mut out = BTreeSet::new();
    for i in 0..rows.len() {
        for j in i + 1..rows.len() {
            let all = rows[i]
                .iter()
                .zip(&rows[j])
                .all(|((af, at), (bf, bt))| bf <= at && af <= bt);
            if all {
                out.extend([ids[i], ids[j]]);
            }
        }
    }
    out
}

fn pick(table: &TableContents, index: usize) -> Option<RowId> {
    if table.row_count() == 0 {
        return None;
    }
    table.row_at(index % table.row_count()).map(|row| row.id())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: every validation pass reports exactly the rows a pairwise
    /// comparison finds, no matter how the indexes went stale in between.
    #[test]
    fn prop_incremental_matches_brute_force(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut table = table();

        for op in ops {
            match op {
                Op::Push(code, from, to) => {
                    table.push_row(vec![Some(code), Some(from), Some(to)]).unwrap();
                }
                Op::Set(index, column, value) => {
                    if let Some(id) = pick(&table, index) {
                        table.set_value(id, column, value).unwrap();
                    }
                }
                Op::Null(index, column) => {
                    if let Some(id) = pick(&table, index) {
                        table.set_null(id, column).unwrap();
                    }
                }
                Op::Remove(index) => {
                    if let Some(id) = pick(&table, index) {
                        table.remove_row(id).unwrap();
                    }
                }
                Op::Validate => check(&mut table)?,
            }
        }
        check(&mut table)?;
    }

    /// Property: a second pass without edits reports the same rows.
    #[test]
    fn prop_validation_is_stable(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut table = table();
        for op in ops {
            if let Op::Push(code, from, to) = op {
                table.push_row(vec![Some(code), Some(from), Some(to)]).unwrap();
            }
        }

        let first = table.validate();
        let second = table.validate();

        prop_assert_eq!(first.messages, second.messages);
        prop_assert!(!second.status_changed);
    }

    /// Property: a key with three range items reports exactly the rows whose
    /// intervals overlap in every item with some other row.
    #[test]
    fn prop_compound_ranges_match_brute_force(rows in proptest::collection::vec(boxed_strategy(), 0..40)) {
        let mut table = compound_table(&rows);
        let ids: Vec<RowId> = table.rows().iter().map(|row| row.id()).collect();

        let outcome = table.validate();
        let reported: BTreeSet<RowId> = outcome.messages.iter().filter_map(|m| m.row).collect();

        prop_assert_eq!(reported, expected_box_overlaps(&ids, &rows));
    }
}
