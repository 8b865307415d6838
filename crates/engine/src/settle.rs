//! Settlement-aware realized-PnL resolution.
//!
//! FIFO realized PnL is only populated once a trade settles (T+1 or later).
//! For instruments that expire the day they trade, the mark-to-market figure
//! plus commission stands in until settlement so the PnL is visible at T+0.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;

use flex_pnl_core::record::TradeRecord;

/// The "soon to settle" date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SettlementWindow {
    /// Window for a given calendar day.
    ///
    /// The lower bound rolls weekend days back to Friday (nothing settles
    /// on a weekend); the upper bound is three calendar days out to cover
    /// T+1 landing on a weekend or holiday.
    #[must_use]
    pub fn for_today(today: NaiveDate) -> Self {
        let start = match today.weekday() {
            Weekday::Sat => today - Duration::days(1),
            Weekday::Sun => today - Duration::days(2),
            _ => today,
        };
        Self {
            start,
            end: today + Duration::days(3),
        }
    }

    /// True if `date` falls inside the window (inclusive on both ends).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Resolve `pnl_realized` for every row, then drop rows that carry no
/// realized economics yet.
///
/// A row expiring on its trade date, with no FIFO figure yet and settlement
/// inside the window, takes `mtm_pnl + ib_commission` (mark-to-market
/// excludes commission); every other row takes `fifo_pnl_realized`. The
/// filter keeps closing rows, plus opening rows that are realized but not
/// yet settled — 0DTE positions the ledger has not formally closed.
pub fn resolve_realized_pnl(
    records: Vec<TradeRecord>,
    window: &SettlementWindow,
) -> Vec<TradeRecord> {
    records
        .into_iter()
        .map(|mut record| {
            let awaiting_settlement = record.expiry == Some(record.trade_date)
                && record.fifo_pnl_realized.is_zero()
                && window.contains(record.settle_date_target);

            let pnl = if awaiting_settlement {
                record.mtm_pnl + record.ib_commission
            } else {
                record.fifo_pnl_realized
            };
            record.pnl_realized = Some(pnl);
            record
        })
        .filter(|record| {
            record.is_closing()
                || (window.contains(record.settle_date_target)
                    && record.realized() != Decimal::ZERO)
        })
        .collect()
}
