//! Read-only reporting over the reconciled trade table.
//!
//! The dashboard consumes the pipeline's output exclusively through this
//! crate: set-based filters, time bucketing, and the aggregate figures
//! (daily/cumulative PnL, win rate, premium capture). Everything here is a
//! pure function over a borrowed table.

pub mod filter;
pub mod metrics;

#[cfg(test)]
pub(crate) mod testutil;

pub use filter::{available_periods, bucket_label, ReportFilter, TimeBucket, TimeFilter};
pub use metrics::{daily_pnl, premium_capture, DailyPnl, PremiumCapture, TradeMetrics};
