//! Filtering the reconciled table for display.
//!
//! Every filter dimension is a set: `None` means unconstrained, a set means
//! membership. Time filtering buckets trade dates into week / month /
//! quarter labels and matches them against the selected labels.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use flex_pnl_core::record::{AssetCategory, Strategy, TradeRecord};

/// Granularity of the time filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    Week,
    Month,
    Quarter,
}

/// Bucket label for a trade date (weeks as `2024-W01`, months as
/// `2024-01`, quarters as `2024Q1`).
#[must_use]
pub fn bucket_label(date: NaiveDate, bucket: TimeBucket) -> String {
    match bucket {
        TimeBucket::Week => date.format("%Y-W%U").to_string(),
        TimeBucket::Month => date.format("%Y-%m").to_string(),
        TimeBucket::Quarter => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
    }
}

/// Sorted distinct bucket labels present in a table — the choices a
/// dashboard offers for a given granularity.
#[must_use]
pub fn available_periods(records: &[TradeRecord], bucket: TimeBucket) -> Vec<String> {
    let mut labels: Vec<String> = records
        .iter()
        .map(|r| bucket_label(r.trade_date, bucket))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    labels.sort();
    labels
}

/// Time dimension of a report query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeFilter {
    /// No time constraint.
    #[default]
    Total,
    /// Keep rows whose bucket label is in `selected`. An empty selection
    /// matches nothing.
    Periods {
        bucket: TimeBucket,
        selected: HashSet<String>,
    },
}

impl TimeFilter {
    fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Total => true,
            Self::Periods { bucket, selected } => selected.contains(&bucket_label(date, *bucket)),
        }
    }
}

/// A report query over the reconciled table.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub asset_categories: Option<HashSet<AssetCategory>>,
    pub symbols: Option<HashSet<String>>,
    pub strategies: Option<HashSet<Strategy>>,
    pub time: TimeFilter,
}

impl ReportFilter {
    /// Constrain to a set of asset categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = AssetCategory>) -> Self {
        self.asset_categories = Some(categories.into_iter().collect());
        self
    }

    /// Constrain to a set of underlying symbols.
    #[must_use]
    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = String>) -> Self {
        self.symbols = Some(symbols.into_iter().collect());
        self
    }

    /// Constrain to a set of option strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies = Some(strategies.into_iter().collect());
        self
    }

    /// Constrain to selected time-bucket labels.
    #[must_use]
    pub fn with_periods(
        mut self,
        bucket: TimeBucket,
        selected: impl IntoIterator<Item = String>,
    ) -> Self {
        self.time = TimeFilter::Periods {
            bucket,
            selected: selected.into_iter().collect(),
        };
        self
    }

    fn matches(&self, record: &TradeRecord) -> bool {
        if let Some(categories) = &self.asset_categories {
            if !categories.contains(&record.asset_category) {
                return false;
            }
        }
        if let Some(symbols) = &self.symbols {
            if !symbols.contains(&record.underlying_symbol) {
                return false;
            }
        }
        if let Some(strategies) = &self.strategies {
            match record.option_strategy {
                Some(strategy) if strategies.contains(&strategy) => {}
                _ => return false,
            }
        }
        self.time.matches(record.trade_date)
    }

    /// Apply the query, returning the matching rows.
    #[must_use]
    pub fn apply(&self, records: &[TradeRecord]) -> Vec<TradeRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
