//! Fixtures for the report tests: rows as they look after reconciliation.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose, PutCall, TradeRecord};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}

/// A reconciled closing stock row with a resolved PnL.
pub(crate) fn closed_trade(description: &str, date: &str, pnl: Decimal) -> TradeRecord {
    let trade_date = day(date);
    let opened = trade_date.and_hms_opt(9, 31, 0).expect("valid time");
    TradeRecord {
        description: description.to_string(),
        asset_category: AssetCategory::Stk,
        underlying_symbol: description
            .split_whitespace()
            .next()
            .unwrap_or(description)
            .to_string(),
        put_call: None,
        buy_sell: BuySell::Sell,
        strike: None,
        expiry: None,
        trade_date,
        date_time: trade_date.and_hms_opt(15, 59, 0).expect("valid time"),
        settle_date_target: trade_date + Duration::days(1),
        open_close: OpenClose::Close,
        notes: None,
        ib_commission: Decimal::ZERO,
        cost: Decimal::ZERO,
        fifo_pnl_realized: pnl,
        mtm_pnl: Decimal::ZERO,
        open_date_time: Some(opened),
        pnl_realized: Some(pnl),
        option_strategy: None,
    }
}

/// A reconciled closing option row with a resolved PnL.
pub(crate) fn option_trade(description: &str, date: &str, pnl: Decimal) -> TradeRecord {
    let mut record = closed_trade(description, date, pnl);
    record.asset_category = AssetCategory::Opt;
    record.put_call = Some(PutCall::Put);
    record.strike = Some(Decimal::from(100));
    record.expiry = Some(record.trade_date);
    record
}
