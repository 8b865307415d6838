//! Same-day duplicate collapse.
//!
//! A position that expires the day it was opened can show up twice: once as
//! the original opening fill and once as the assignment/exercise-generated
//! closing fill, both on the same trade date. Keeping both would count the
//! same economic event twice.

use std::collections::HashMap;

use chrono::NaiveDate;

use flex_pnl_core::record::TradeRecord;

/// Collapse same-day open/close pairs to one terminal record per position.
///
/// Within each (`description`, `trade_date`) group that contains a closing
/// row, closing rows always survive; opening rows survive only when their
/// `date_time` is strictly after the latest close — a genuine same-day
/// re-entry, not the duplicate of a close we already kept. Groups without a
/// closing row pass through unchanged.
pub fn collapse_same_day_duplicates(records: Vec<TradeRecord>) -> Vec<TradeRecord> {
    let mut order: Vec<(String, NaiveDate)> = Vec::new();
    let mut groups: HashMap<(String, NaiveDate), Vec<TradeRecord>> = HashMap::new();

    for record in records {
        let key = (record.description.clone(), record.trade_date);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        group.push(record);
    }

    let mut out = Vec::new();
    for key in order {
        let group = groups.remove(&key).expect("group recorded in order");
        let latest_close = group
            .iter()
            .filter(|r| r.is_closing())
            .map(|r| r.date_time)
            .max();

        match latest_close {
            None => out.extend(group),
            Some(cutoff) => {
                out.extend(
                    group
                        .into_iter()
                        .filter(|r| r.is_closing() || r.date_time > cutoff),
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::row;
    use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose};

    fn opt_row(open_close: OpenClose, when: &str) -> TradeRecord {
        row(
            "AAPL 150C",
            AssetCategory::Opt,
            BuySell::Buy,
            open_close,
            when,
        )
    }

    #[test]
    fn closing_row_wins_over_same_day_open() {
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 09:31:00"),
            opt_row(OpenClose::Close, "2024-01-05 15:59:00"),
        ]);

        assert_eq!(out.len(), 1);
        assert!(out[0].is_closing());
    }

    #[test]
    fn reentry_after_the_close_survives() {
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 09:31:00"),
            opt_row(OpenClose::Close, "2024-01-05 11:00:00"),
            opt_row(OpenClose::Open, "2024-01-05 14:30:00"),
        ]);

        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|r| r.is_closing()));
        assert!(out
            .iter()
            .any(|r| r.is_opening() && r.date_time == crate::testutil::dt("2024-01-05 14:30:00")));
    }

    #[test]
    fn every_open_after_the_last_close_survives() {
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 09:31:00"),
            opt_row(OpenClose::Close, "2024-01-05 11:00:00"),
            opt_row(OpenClose::Open, "2024-01-05 14:30:00"),
            opt_row(OpenClose::Open, "2024-01-05 15:10:00"),
        ]);

        assert_eq!(out.len(), 3);
        assert_eq!(out.iter().filter(|r| r.is_opening()).count(), 2);
    }

    #[test]
    fn open_at_the_close_instant_is_collapsed() {
        // Strictly-after tie-break: an open at exactly the close instant is
        // the duplicate, not a re-entry.
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 15:59:00"),
            opt_row(OpenClose::Close, "2024-01-05 15:59:00"),
        ]);

        assert_eq!(out.len(), 1);
        assert!(out[0].is_closing());
    }

    #[test]
    fn groups_without_a_close_pass_through() {
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 09:31:00"),
            opt_row(OpenClose::Open, "2024-01-05 10:15:00"),
        ]);

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn different_trade_dates_are_not_collapsed() {
        let out = collapse_same_day_duplicates(vec![
            opt_row(OpenClose::Open, "2024-01-05 09:31:00"),
            opt_row(OpenClose::Close, "2024-01-08 10:00:00"),
        ]);

        assert_eq!(out.len(), 2);
    }
}
