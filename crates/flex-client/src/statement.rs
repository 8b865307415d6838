//! Flex statement decoding.
//!
//! Both Flex endpoints answer XML. `SendRequest` returns a reference code
//! (or an error element); `GetStatement` returns either an error element or
//! the statement itself, whose `<Trade>` rows carry every field as an
//! attribute. Dates arrive in the fixed-width wire formats handled by
//! `flex_pnl_core::wire`.

use std::collections::HashMap;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rust_decimal::Decimal;

use flex_pnl_core::record::{AssetCategory, BuySell, OpenClose, PutCall, TradeRecord};
use flex_pnl_core::wire;

use crate::error::{FlexError, Result};

/// Everything we pull out of one response body in a single scan.
#[derive(Debug, Default)]
struct ResponseScan {
    reference_code: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    trades: Vec<HashMap<String, String>>,
}

fn scan(xml: &str) -> Result<ResponseScan> {
    let mut reader = Reader::from_str(xml);
    let mut out = ResponseScan::default();
    let mut current_element: Option<String> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| FlexError::Malformed(format!("invalid XML: {e}")))?
        {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Trade" {
                    out.trades.push(attributes(&e)?);
                }
                current_element = Some(name);
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"Trade" {
                    out.trades.push(attributes(&e)?);
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| FlexError::Malformed(format!("invalid XML text: {e}")))?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match current_element.as_deref() {
                    Some("ReferenceCode") => out.reference_code = Some(text.to_string()),
                    Some("ErrorCode") => out.error_code = Some(text.to_string()),
                    Some("ErrorMessage") => out.error_message = Some(text.to_string()),
                    _ => {}
                }
            }
            Event::End(_) => current_element = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| FlexError::Malformed(format!("invalid attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| FlexError::Malformed(format!("invalid attribute value: {e}")))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Decode a `SendRequest` response into the statement reference code.
pub fn parse_send_response(xml: &str) -> Result<String> {
    let scan = scan(xml)?;
    if let Some(code) = scan.error_code {
        return Err(FlexError::upstream(
            code,
            scan.error_message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    scan.reference_code.ok_or_else(|| {
        FlexError::Malformed("response carries neither a reference code nor an error".to_string())
    })
}

/// Decode a `GetStatement` response into trade records.
///
/// An upstream error element wins over anything else in the body; an error
/// code of 1019 surfaces as [`FlexError::GenerationPending`] for the
/// caller's retry loop. A statement with no `<Trade>` rows is an empty
/// table, not an error.
pub fn parse_statement(xml: &str) -> Result<Vec<TradeRecord>> {
    let scan = scan(xml)?;
    if let Some(code) = scan.error_code {
        return Err(FlexError::upstream(
            code,
            scan.error_message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    scan.trades.iter().map(|attrs| decode_trade(attrs)).collect()
}

fn required<'a>(attrs: &'a HashMap<String, String>, column: &str) -> Result<&'a str> {
    attrs
        .get(column)
        .map(String::as_str)
        .ok_or_else(|| FlexError::Malformed(format!("missing column {column}")))
}

fn optional<'a>(attrs: &'a HashMap<String, String>, column: &str) -> Option<&'a str> {
    attrs.get(column).map(String::as_str).filter(|v| !v.is_empty())
}

fn money(attrs: &HashMap<String, String>, column: &str) -> Result<Decimal> {
    match optional(attrs, column) {
        None => Ok(Decimal::ZERO),
        Some(raw) => Decimal::from_str(raw)
            .map_err(|_| FlexError::Malformed(format!("invalid decimal in {column}: {raw:?}"))),
    }
}

fn decode_trade(attrs: &HashMap<String, String>) -> Result<TradeRecord> {
    let buy_sell = required(attrs, "buySell").and_then(|raw| {
        BuySell::from_code(raw)
            .ok_or_else(|| FlexError::Malformed(format!("invalid buySell: {raw:?}")))
    })?;
    let open_close = required(attrs, "openCloseIndicator").and_then(|raw| {
        OpenClose::from_code(raw)
            .ok_or_else(|| FlexError::Malformed(format!("invalid openCloseIndicator: {raw:?}")))
    })?;
    let put_call = match optional(attrs, "putCall") {
        None => None,
        Some(raw) => Some(
            PutCall::from_code(raw)
                .ok_or_else(|| FlexError::Malformed(format!("invalid putCall: {raw:?}")))?,
        ),
    };
    let strike = match optional(attrs, "strike") {
        None => None,
        Some(raw) => Some(Decimal::from_str(raw).map_err(|_| {
            FlexError::Malformed(format!("invalid decimal in strike: {raw:?}"))
        })?),
    };
    let expiry = optional(attrs, "expiry")
        .map(wire::parse_date)
        .transpose()?;

    Ok(TradeRecord {
        description: required(attrs, "description")?.to_string(),
        asset_category: AssetCategory::from_code(required(attrs, "assetCategory")?),
        underlying_symbol: required(attrs, "underlyingSymbol")?.to_string(),
        put_call,
        buy_sell,
        strike,
        expiry,
        trade_date: wire::parse_date(required(attrs, "tradeDate")?)?,
        date_time: wire::parse_date_time(required(attrs, "dateTime")?)?,
        settle_date_target: wire::parse_date(required(attrs, "settleDateTarget")?)?,
        open_close,
        notes: optional(attrs, "notes").map(str::to_string),
        ib_commission: money(attrs, "ibCommission")?,
        cost: money(attrs, "cost")?,
        fifo_pnl_realized: money(attrs, "fifoPnlRealized")?,
        mtm_pnl: money(attrs, "mtmPnl")?,
        open_date_time: None,
        pnl_realized: None,
        option_strategy: None,
    })
}
