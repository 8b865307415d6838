//! Shared fixtures for the stage tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose, PutCall, TradeRecord};

pub(crate) fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}

pub(crate) fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("test timestamp")
}

/// A plain execution row with zeroed monetary fields.
pub(crate) fn row(
    description: &str,
    asset_category: AssetCategory,
    buy_sell: BuySell,
    open_close: OpenClose,
    when: &str,
) -> TradeRecord {
    let date_time = dt(when);
    TradeRecord {
        description: description.to_string(),
        asset_category,
        underlying_symbol: description
            .split_whitespace()
            .next()
            .unwrap_or(description)
            .to_string(),
        put_call: None,
        buy_sell,
        strike: None,
        expiry: None,
        trade_date: date_time.date(),
        date_time,
        settle_date_target: date_time.date() + Duration::days(1),
        open_close,
        notes: None,
        ib_commission: Decimal::ZERO,
        cost: Decimal::ZERO,
        fifo_pnl_realized: Decimal::ZERO,
        mtm_pnl: Decimal::ZERO,
        open_date_time: None,
        pnl_realized: None,
        option_strategy: None,
    }
}

/// An opening option leg.
pub(crate) fn opt_leg(
    description: &str,
    right: PutCall,
    side: BuySell,
    strike: Decimal,
    expiry: &str,
    when: &str,
) -> TradeRecord {
    let mut leg = row(description, AssetCategory::Opt, side, OpenClose::Open, when);
    leg.put_call = Some(right);
    leg.strike = Some(strike);
    leg.expiry = Some(day(expiry));
    leg
}

/// A partial fill of an option close, tagged `P`, at a fixed instant.
pub(crate) fn partial(
    description: &str,
    commission: Decimal,
    cost: Decimal,
    fifo: Decimal,
    mtm: Decimal,
) -> TradeRecord {
    let mut fill = row(
        description,
        AssetCategory::Opt,
        BuySell::Buy,
        OpenClose::Close,
        "2024-01-05 15:59:00",
    );
    fill.notes = Some("P".to_string());
    fill.ib_commission = commission;
    fill.cost = cost;
    fill.fifo_pnl_realized = fifo;
    fill.mtm_pnl = mtm;
    fill
}
