//! Flex Web Service integration.
//!
//! Drives the two-step statement-generation protocol (request, then poll
//! with bounded fixed-delay retry) and decodes the XML statement into the
//! core trade-record table. The reconciliation pipeline itself never does
//! I/O — this crate is the only place the network is touched.

pub mod client;
pub mod error;
pub mod statement;

pub use client::FlexClient;
pub use error::{FlexError, Result};
