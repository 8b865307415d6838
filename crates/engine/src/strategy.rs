//! Option-strategy classification.
//!
//! Option legs opened in the same instant came from one combo order; the
//! leg count, put/call and buy/sell composition, expiry uniformity, and
//! relative strikes determine the strategy. The decision table is a pure
//! function over pre-sorted legs so tie-breaks stay auditable, and the
//! result is broadcast back onto every row of the position — closing fills
//! inherit the strategy their opening legs were tagged with.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use flex_pnl_core::record::{BuySell, PutCall, Strategy, TradeRecord};

/// One option leg as the classifier sees it.
#[derive(Debug, Clone, Copy)]
struct Leg {
    right: PutCall,
    side: BuySell,
    strike: Decimal,
    expiry: NaiveDate,
}

impl Leg {
    fn of(record: &TradeRecord) -> Option<Self> {
        Some(Self {
            right: record.put_call?,
            side: record.buy_sell,
            strike: record.strike?,
            expiry: record.expiry?,
        })
    }
}

/// Tag every row of the table with its position's identified strategy.
///
/// Only opening OPT/FOP rows participate in identification; the tag is then
/// joined back by (`description`, `open_date_time`) so closing rows of the
/// same position carry it too. Non-option rows stay untagged.
pub fn classify_strategies(records: &mut [TradeRecord]) {
    let mut orders: HashMap<NaiveDateTime, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        if record.is_opening() && record.asset_category.is_option() {
            orders.entry(record.date_time).or_default().push(i);
        }
    }

    let mut tags: HashMap<(String, NaiveDateTime), Strategy> = HashMap::new();
    for (instant, leg_rows) in &orders {
        let legs: Option<Vec<Leg>> = leg_rows.iter().map(|&i| Leg::of(&records[i])).collect();
        // A leg without strike/right/expiry cannot be identified.
        let strategy = legs.map_or(Strategy::Other, |mut legs| identify_strategy(&mut legs));
        for &i in leg_rows {
            tags.insert((records[i].description.clone(), *instant), strategy);
        }
    }

    for record in records.iter_mut() {
        if let Some(opened) = record.open_date_time {
            record.option_strategy = tags.get(&(record.description.clone(), opened)).copied();
        }
    }
}

/// The decision table. Legs are sorted by strike before matching.
fn identify_strategy(legs: &mut [Leg]) -> Strategy {
    legs.sort_by(|a, b| a.strike.cmp(&b.strike));

    match legs {
        [single] => match (single.right, single.side) {
            (PutCall::Call, BuySell::Buy) => Strategy::LongCall,
            (PutCall::Call, BuySell::Sell) => Strategy::ShortCall,
            (PutCall::Put, BuySell::Buy) => Strategy::LongPut,
            (PutCall::Put, BuySell::Sell) => Strategy::ShortPut,
        },
        [low, high] => identify_two_legs(*low, *high),
        [a, b, c, d] => identify_four_legs([*a, *b, *c, *d]),
        _ => Strategy::Other,
    }
}

fn identify_two_legs(low: Leg, high: Leg) -> Strategy {
    let same_expiry = low.expiry == high.expiry;

    if low.right != high.right {
        // One put, one call. Only the all-long combination is a named
        // strategy; short straddles/strangles fall through to Other.
        if low.side != BuySell::Buy || high.side != BuySell::Buy {
            return Strategy::Other;
        }
        let (call, put) = if low.right == PutCall::Call {
            (low, high)
        } else {
            (high, low)
        };
        return if call.strike == put.strike {
            Strategy::Straddle
        } else if call.strike > put.strike {
            Strategy::Strangle
        } else {
            Strategy::Other
        };
    }

    // Same right: a spread needs exactly one sold and one bought leg.
    if low.side == high.side {
        return Strategy::Other;
    }
    let (sold, bought) = if low.side == BuySell::Sell {
        (low, high)
    } else {
        (high, low)
    };

    match (low.right, same_expiry) {
        (PutCall::Call, true) => {
            if sold.strike < bought.strike {
                Strategy::BearCallSpread
            } else {
                Strategy::BullCallSpread
            }
        }
        (PutCall::Put, true) => {
            if sold.strike < bought.strike {
                Strategy::BearPutSpread
            } else {
                Strategy::BullPutSpread
            }
        }
        (PutCall::Call, false) => {
            if sold.strike == bought.strike {
                Strategy::CalendarCallSpread
            } else if sold.strike > bought.strike {
                Strategy::DiagonalCallSpread
            } else {
                Strategy::Other
            }
        }
        (PutCall::Put, false) => {
            if sold.strike == bought.strike {
                Strategy::CalendarPutSpread
            } else if sold.strike < bought.strike {
                Strategy::DiagonalPutSpread
            } else {
                Strategy::Other
            }
        }
    }
}

fn identify_four_legs(legs: [Leg; 4]) -> Strategy {
    let [a, b, c, d] = &legs;
    if !(a.expiry == b.expiry && b.expiry == c.expiry && c.expiry == d.expiry) {
        return Strategy::Other;
    }

    let mixed_rights = legs.iter().any(|l| l.right == PutCall::Call)
        && legs.iter().any(|l| l.right == PutCall::Put);
    let mixed_sides = legs.iter().any(|l| l.side == BuySell::Buy)
        && legs.iter().any(|l| l.side == BuySell::Sell);
    if !mixed_sides {
        return Strategy::Other;
    }

    // Strikes arrive sorted ascending from identify_strategy.
    let s = [a.strike, b.strike, c.strike, d.strike];

    if mixed_rights {
        if s[0] < s[1] && s[1] < s[2] && s[2] < s[3] {
            Strategy::IronCondor
        } else if s[1] == s[2] {
            Strategy::IronButterfly
        } else if s[0] == s[1] && s[2] == s[3] {
            Strategy::BoxSpread
        } else {
            Strategy::Other
        }
    } else if s[0] < s[1] && s[1] == s[2] && s[2] < s[3] {
        // Wing-body-body-wing in a single right.
        match a.right {
            PutCall::Put => Strategy::LongPutButterfly,
            PutCall::Call => Strategy::LongCallButterfly,
        }
    } else {
        Strategy::Other
    }
}
