//! Aggregates over a (filtered) reconciled table.
//!
//! A "position" here is one `open_date_time` group — all fills that share an
//! open instant count as one trade for win-rate purposes. Monetary sums stay
//! in `Decimal`; only ratios degrade to `f64`.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flex_pnl_core::record::TradeRecord;

/// Realized PnL summed per trade date, with a running cumulative total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub cumulative: Decimal,
}

/// Sum realized PnL per day, date-ascending, with the cumulative series.
#[must_use]
pub fn daily_pnl(records: &[TradeRecord]) -> Vec<DailyPnl> {
    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in records {
        *per_day.entry(record.trade_date).or_insert(Decimal::ZERO) += record.realized();
    }

    let mut running = Decimal::ZERO;
    per_day
        .into_iter()
        .map(|(date, pnl)| {
            running += pnl;
            DailyPnl {
                date,
                pnl,
                cumulative: running,
            }
        })
        .collect()
}

/// Per-position outcome statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    /// Distinct open instants in the table.
    pub total_positions: usize,
    /// Positions with net-positive realized PnL.
    pub wins: usize,
    /// Positions that did not win (flat counts as a loss).
    pub losses: usize,
    /// Wins as a percentage of positions (0 when the table is empty).
    pub win_rate_pct: f64,
    pub avg_per_trade: Decimal,
    pub avg_winner: Decimal,
    pub avg_loser: Decimal,
    pub max_winner: Decimal,
    pub max_loser: Decimal,
}

impl TradeMetrics {
    /// Compute outcome statistics over a table. Rows that never went through
    /// the open/close linker (no `open_date_time`) are ignored.
    #[must_use]
    pub fn compute(records: &[TradeRecord]) -> Self {
        let mut per_position: HashMap<NaiveDateTime, Decimal> = HashMap::new();
        for record in records {
            if let Some(opened) = record.open_date_time {
                *per_position.entry(opened).or_insert(Decimal::ZERO) += record.realized();
            }
        }

        let sums: Vec<Decimal> = per_position.into_values().collect();
        let total_positions = sums.len();
        let winners: Vec<Decimal> = sums.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
        let losers: Vec<Decimal> = sums.iter().copied().filter(|p| *p < Decimal::ZERO).collect();

        let wins = winners.len();
        #[allow(clippy::cast_precision_loss)]
        let win_rate_pct = if total_positions > 0 {
            wins as f64 / total_positions as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_positions,
            wins,
            losses: total_positions - wins,
            win_rate_pct,
            avg_per_trade: mean(&sums),
            avg_winner: mean(&winners),
            avg_loser: mean(&losers),
            max_winner: winners.iter().copied().max().unwrap_or(Decimal::ZERO),
            max_loser: losers.iter().copied().min().unwrap_or(Decimal::ZERO),
        }
    }
}

/// Premium-capture statistics over the option rows of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumCapture {
    /// |Σ cost| across OPT/FOP rows.
    pub premium_sold: Decimal,
    /// Σ realized PnL across the same rows.
    pub premium_captured: Decimal,
    /// captured / sold × 100, zero when no premium was sold.
    pub capture_rate_pct: Decimal,
}

/// Compute premium capture over the OPT/FOP rows of a table.
#[must_use]
pub fn premium_capture(records: &[TradeRecord]) -> PremiumCapture {
    let options: Vec<&TradeRecord> = records
        .iter()
        .filter(|r| r.asset_category.is_option())
        .collect();

    let premium_sold = options
        .iter()
        .map(|r| r.cost)
        .sum::<Decimal>()
        .abs()
        .round_dp(2);
    let premium_captured = options
        .iter()
        .map(|r| r.realized())
        .sum::<Decimal>()
        .round_dp(2);
    let capture_rate_pct = if premium_sold.is_zero() {
        Decimal::ZERO
    } else {
        (premium_captured / premium_sold * Decimal::ONE_HUNDRED).round_dp(2)
    };

    PremiumCapture {
        premium_sold,
        premium_captured,
        capture_rate_pct,
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}
