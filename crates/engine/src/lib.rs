//! Trade-reconciliation engine.
//!
//! Turns a raw, possibly duplicated, partially-filled execution ledger into
//! one row per economically closed position, with a settlement-aware
//! realized-PnL figure and, for option legs, an identified strategy.
//!
//! The pipeline is a batch transform over an in-memory table: pure,
//! synchronous, idempotent, and stateless between runs. Stages run strictly
//! forward; classification happens before PnL filtering so the classifier
//! still sees every leg it needs.

pub mod collapse;
pub mod consolidate;
pub mod link;
pub mod settle;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testutil;

use chrono::NaiveDate;

use flex_pnl_core::record::TradeRecord;

pub use settle::SettlementWindow;

/// Run the full reconciliation pipeline over a raw statement table.
///
/// `today` anchors the settlement window; inject it so runs are
/// reproducible and the window rule is testable.
#[must_use]
pub fn reconcile(records: Vec<TradeRecord>, today: NaiveDate) -> Vec<TradeRecord> {
    let raw = records.len();
    let mut table = consolidate::consolidate_partial_fills(records);
    link::link_open_instants(&mut table);
    strategy::classify_strategies(&mut table);

    let window = SettlementWindow::for_today(today);
    let table = settle::resolve_realized_pnl(table, &window);
    let table = collapse::collapse_same_day_duplicates(table);

    tracing::debug!(raw, reconciled = table.len(), "Reconciled statement");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{day, dt, opt_leg, partial, row};
    use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose, PutCall, Strategy};
    use rust_decimal_macros::dec;

    /// A 0DTE short straddle opened at 09:31, bought back via two partial
    /// fills at 15:59, reconciled before settlement.
    #[test]
    fn zero_dte_straddle_end_to_end() {
        let today = day("2024-01-05");
        let opened = "2024-01-05 09:31:00";

        let mut call_open = opt_leg("SPX 5000C", PutCall::Call, BuySell::Buy, dec!(5000), "2024-01-05", opened);
        let mut put_open = opt_leg("SPX 5000P", PutCall::Put, BuySell::Buy, dec!(5000), "2024-01-05", opened);
        for leg in [&mut call_open, &mut put_open] {
            leg.cost = dec!(-250);
            leg.settle_date_target = day("2024-01-08");
        }

        let mut close_a = partial("SPX 5000C", dec!(-0.60), dec!(180), dec!(0), dec!(65));
        let mut close_b = partial("SPX 5000C", dec!(-0.40), dec!(120), dec!(0), dec!(36));
        for fill in [&mut close_a, &mut close_b] {
            fill.put_call = Some(PutCall::Call);
            fill.strike = Some(dec!(5000));
            fill.expiry = Some(day("2024-01-05"));
            fill.settle_date_target = day("2024-01-08");
        }

        let out = reconcile(vec![call_open, put_open, close_a, close_b], today);

        // The call: open + consolidated close collapse to the close alone.
        let call: Vec<_> = out.iter().filter(|r| r.description == "SPX 5000C").collect();
        assert_eq!(call.len(), 1);
        assert!(call[0].is_closing());
        assert!(call[0].is_partial());
        // mtm (65 + 36) + commission (-1.00)
        assert_eq!(call[0].pnl_realized, Some(dec!(100.00)));
        assert_eq!(call[0].open_date_time, Some(dt(opened)));
        // Both legs left in the same instant: one combo order, a straddle.
        assert_eq!(call[0].option_strategy, Some(Strategy::Straddle));

        // The put was never closed and its mark-to-market estimate is zero:
        // no realized economics, so the PnL filter drops it.
        let put: Vec<_> = out.iter().filter(|r| r.description == "SPX 5000P").collect();
        assert_eq!(put.len(), 0);
    }

    #[test]
    fn still_open_positions_do_not_reach_the_report() {
        let today = day("2024-01-10");
        let open = row("AAPL", AssetCategory::Stk, BuySell::Buy, OpenClose::Open, "2024-01-09 09:30:00");
        let out = reconcile(vec![open], today);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(reconcile(Vec::new(), day("2024-01-05")).is_empty());
    }

    #[test]
    fn reconcile_is_idempotent_on_its_output() {
        let today = day("2024-01-08");
        let open = row("MSFT", AssetCategory::Stk, BuySell::Buy, OpenClose::Open, "2024-01-03 09:30:00");
        let mut close = row("MSFT", AssetCategory::Stk, BuySell::Sell, OpenClose::Close, "2024-01-05 14:00:00");
        close.fifo_pnl_realized = dec!(42);

        let once = reconcile(vec![open, close], today);
        let twice = reconcile(once.clone(), today);

        assert_eq!(once.len(), twice.len());
        assert_eq!(once[0].pnl_realized, twice[0].pnl_realized);
    }
}
