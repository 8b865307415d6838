//! Core types for Flex statement reconciliation.
//!
//! The trade-record data model, the fixed-width wire formats statements use
//! for dates, and the Flex Web Service configuration. No I/O lives here.

pub mod config;
pub mod record;
pub mod wire;

pub use config::{ConfigError, FlexConfig};
pub use record::{AssetCategory, BuySell, OpenClose, PutCall, Strategy, TradeRecord};
pub use wire::WireError;
