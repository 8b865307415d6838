//! The trade-execution record and its enums.
//!
//! One [`TradeRecord`] is one row of the working table: a single execution
//! (or, after consolidation, a merged set of partial executions) as reported
//! on a Flex statement. The pipeline never mutates a statement in place —
//! each stage consumes a table and produces a new one.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker asset category of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetCategory {
    Stk,
    Opt,
    Fop,
    Fut,
    Cash,
    /// Anything the statement reports that we do not special-case.
    Other,
}

impl AssetCategory {
    /// Statement code as reported by the broker.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Stk => "STK",
            Self::Opt => "OPT",
            Self::Fop => "FOP",
            Self::Fut => "FUT",
            Self::Cash => "CASH",
            Self::Other => "OTHER",
        }
    }

    /// Parse a statement code. Unknown codes map to [`AssetCategory::Other`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "STK" => Self::Stk,
            "OPT" => Self::Opt,
            "FOP" => Self::Fop,
            "FUT" => Self::Fut,
            "CASH" => Self::Cash,
            _ => Self::Other,
        }
    }

    /// True for the option categories (OPT and FOP).
    #[must_use]
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Opt | Self::Fop)
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Execution side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuySell {
    Buy,
    Sell,
}

impl BuySell {
    /// Parse a statement code ("BUY" / "SELL").
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for BuySell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Option right (absent on non-option rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PutCall {
    Call,
    Put,
}

impl PutCall {
    /// Parse a statement code ("C" / "P").
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for PutCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Whether an execution opens or closes a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenClose {
    Open,
    Close,
}

impl OpenClose {
    /// Parse a statement code ("O" / "C").
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "O" => Some(Self::Open),
            "C" => Some(Self::Close),
            _ => None,
        }
    }
}

impl std::fmt::Display for OpenClose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "O"),
            Self::Close => write!(f, "C"),
        }
    }
}

/// Identified multi-leg option strategy.
///
/// Assigned by the classifier to option legs opened in the same instant.
/// [`Strategy::Other`] is the fall-through for leg sets no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    LongCall,
    ShortCall,
    LongPut,
    ShortPut,
    BullCallSpread,
    BearCallSpread,
    BullPutSpread,
    BearPutSpread,
    Straddle,
    Strangle,
    CalendarCallSpread,
    CalendarPutSpread,
    DiagonalCallSpread,
    DiagonalPutSpread,
    IronCondor,
    IronButterfly,
    LongCallButterfly,
    LongPutButterfly,
    BoxSpread,
    Other,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LongCall => "Long Call",
            Self::ShortCall => "Short Call",
            Self::LongPut => "Long Put",
            Self::ShortPut => "Short Put",
            Self::BullCallSpread => "Bull Call Spread",
            Self::BearCallSpread => "Bear Call Spread",
            Self::BullPutSpread => "Bull Put Spread",
            Self::BearPutSpread => "Bear Put Spread",
            Self::Straddle => "Straddle",
            Self::Strangle => "Strangle",
            Self::CalendarCallSpread => "Calendar Call Spread",
            Self::CalendarPutSpread => "Calendar Put Spread",
            Self::DiagonalCallSpread => "Diagonal Call Spread",
            Self::DiagonalPutSpread => "Diagonal Put Spread",
            Self::IronCondor => "Iron Condor",
            Self::IronButterfly => "Iron Butterfly",
            Self::LongCallButterfly => "Long Call Butterfly",
            Self::LongPutButterfly => "Long Put Butterfly",
            Self::BoxSpread => "Box Spread",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// One row of the working trade table.
///
/// The first block of fields comes straight off the statement; the
/// `open_date_time` / `pnl_realized` / `option_strategy` fields are derived
/// by the pipeline and are `None` on a freshly ingested row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Groups legs and fills belonging to one logical instrument/position
    /// (e.g., "AAPL 05JAN24 150 C").
    pub description: String,
    pub asset_category: AssetCategory,
    pub underlying_symbol: String,
    /// Option right; `None` on non-option rows.
    pub put_call: Option<PutCall>,
    pub buy_sell: BuySell,
    /// Strike price; options and future-options only.
    pub strike: Option<Decimal>,
    /// Expiration date; options and future-options only.
    pub expiry: Option<NaiveDate>,
    /// Execution date.
    pub trade_date: NaiveDate,
    /// Execution instant, finer-grained than `trade_date`.
    pub date_time: NaiveDateTime,
    /// Expected settlement date.
    pub settle_date_target: NaiveDate,
    pub open_close: OpenClose,
    /// Broker notes; `P` marks a partial fill.
    pub notes: Option<String>,
    pub ib_commission: Decimal,
    pub cost: Decimal,
    pub fifo_pnl_realized: Decimal,
    pub mtm_pnl: Decimal,
    /// Instant the position was opened. Derived by the open/close linker.
    pub open_date_time: Option<NaiveDateTime>,
    /// Settlement-aware realized PnL. Derived by the PnL resolver.
    pub pnl_realized: Option<Decimal>,
    /// Identified option strategy. Derived by the classifier.
    pub option_strategy: Option<Strategy>,
}

impl TradeRecord {
    /// True if the broker flagged this row as a partial fill.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.notes.as_deref() == Some("P")
    }

    /// True for opening executions.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.open_close == OpenClose::Open
    }

    /// True for closing executions.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.open_close == OpenClose::Close
    }

    /// Resolved realized PnL, zero if the resolver has not run yet.
    #[must_use]
    pub fn realized(&self) -> Decimal {
        self.pnl_realized.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_category_codes_round_trip() {
        for cat in [
            AssetCategory::Stk,
            AssetCategory::Opt,
            AssetCategory::Fop,
            AssetCategory::Fut,
            AssetCategory::Cash,
        ] {
            assert_eq!(AssetCategory::from_code(cat.code()), cat);
        }
    }

    #[test]
    fn unknown_category_maps_to_other() {
        assert_eq!(AssetCategory::from_code("WAR"), AssetCategory::Other);
        assert_eq!(AssetCategory::from_code(""), AssetCategory::Other);
    }

    #[test]
    fn option_categories() {
        assert!(AssetCategory::Opt.is_option());
        assert!(AssetCategory::Fop.is_option());
        assert!(!AssetCategory::Stk.is_option());
        assert!(!AssetCategory::Fut.is_option());
    }

    #[test]
    fn strategy_display_names() {
        assert_eq!(Strategy::IronCondor.to_string(), "Iron Condor");
        assert_eq!(Strategy::BullPutSpread.to_string(), "Bull Put Spread");
        assert_eq!(Strategy::Other.to_string(), "Other");
    }

    #[test]
    fn open_close_codes() {
        assert_eq!(OpenClose::Open.to_string(), "O");
        assert_eq!(OpenClose::Close.to_string(), "C");
    }
}
