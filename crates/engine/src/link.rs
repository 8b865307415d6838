//! Open/close linking.
//!
//! Every row is tagged with the instant its position was opened, so that
//! downstream grouping (strategy classification, per-position win rate) can
//! treat all fills of one position as a unit.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use flex_pnl_core::record::TradeRecord;

/// Attach the position-open instant to every row.
///
/// For each `description` group the open instant is the `date_time` of the
/// first opening fill in table order; a group with no opening fill (the
/// position predates the statement window) falls back to its first fill.
/// One pass builds the group-to-instant mapping, a second broadcasts it —
/// no per-group rescans of the whole table.
pub fn link_open_instants(records: &mut [TradeRecord]) {
    let mut first_fill: HashMap<&str, NaiveDateTime> = HashMap::new();
    let mut first_open: HashMap<&str, NaiveDateTime> = HashMap::new();

    for record in records.iter() {
        first_fill
            .entry(record.description.as_str())
            .or_insert(record.date_time);
        if record.is_opening() {
            first_open
                .entry(record.description.as_str())
                .or_insert(record.date_time);
        }
    }

    let instants: HashMap<String, NaiveDateTime> = first_fill
        .into_iter()
        .map(|(description, fallback)| {
            let instant = first_open.get(description).copied().unwrap_or(fallback);
            (description.to_string(), instant)
        })
        .collect();

    for record in records.iter_mut() {
        record.open_date_time = instants.get(&record.description).copied();
    }
}
