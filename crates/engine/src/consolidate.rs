//! Partial-fill consolidation.
//!
//! A single logical order can execute as several partial fills, each
//! reported as its own row tagged `P` in the notes column. Reporting wants
//! one row per logical trade, so partial rows that agree on every identity
//! field are merged by summing their four monetary columns.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose, PutCall, TradeRecord};

/// Identity of a logical trade: every statement field except the four
/// monetary columns and the partial-fill marker itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FillKey {
    description: String,
    asset_category: AssetCategory,
    underlying_symbol: String,
    put_call: Option<PutCall>,
    buy_sell: BuySell,
    strike: Option<Decimal>,
    expiry: Option<NaiveDate>,
    trade_date: NaiveDate,
    date_time: NaiveDateTime,
    settle_date_target: NaiveDate,
    open_close: OpenClose,
}

impl FillKey {
    fn of(record: &TradeRecord) -> Self {
        Self {
            description: record.description.clone(),
            asset_category: record.asset_category,
            underlying_symbol: record.underlying_symbol.clone(),
            put_call: record.put_call,
            buy_sell: record.buy_sell,
            strike: record.strike,
            expiry: record.expiry,
            trade_date: record.trade_date,
            date_time: record.date_time,
            settle_date_target: record.settle_date_target,
            open_close: record.open_close,
        }
    }
}

/// Merge partial fills of the same logical trade into one row.
///
/// Rows tagged `P` are grouped by [`FillKey`]; commission, cost, FIFO PnL,
/// and mark-to-market PnL are summed per group and the merged row keeps the
/// `P` tag. Non-partial rows pass through untouched. The result is re-sorted
/// by (asset category descending, description, execution instant).
pub fn consolidate_partial_fills(records: Vec<TradeRecord>) -> Vec<TradeRecord> {
    let (partials, mut table): (Vec<_>, Vec<_>) =
        records.into_iter().partition(TradeRecord::is_partial);

    if !partials.is_empty() {
        // Group in first-seen order so equal-sort-key rows stay deterministic.
        let mut merged: Vec<TradeRecord> = Vec::new();
        let mut index: HashMap<FillKey, usize> = HashMap::new();

        for fill in partials {
            match index.get(&FillKey::of(&fill)) {
                Some(&i) => {
                    let row = &mut merged[i];
                    row.ib_commission += fill.ib_commission;
                    row.cost += fill.cost;
                    row.fifo_pnl_realized += fill.fifo_pnl_realized;
                    row.mtm_pnl += fill.mtm_pnl;
                }
                None => {
                    index.insert(FillKey::of(&fill), merged.len());
                    merged.push(fill);
                }
            }
        }

        tracing::debug!(consolidated = merged.len(), "Merged partial fills");
        table.extend(merged);
    }

    sort_table(&mut table);
    table
}

/// Statement sort order: asset category descending (STK before OPT), then
/// description, then execution instant.
pub(crate) fn sort_table(records: &mut [TradeRecord]) {
    records.sort_by(|a, b| {
        b.asset_category
            .code()
            .cmp(a.asset_category.code())
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| a.date_time.cmp(&b.date_time))
    });
}
