use std::sync::OnceLock;

use regex::Regex;

use crate::models::{CurrencyAmounts, PriceBreakdown};

pub const DEPOSIT_PERCENT: i64 = 10;

/// Fixed-rate display conversion applied when a price names a single currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub rate: i64,
}

impl Conversion {
    pub fn gbp_to_krw(rate: i64) -> Self {
        Self {
            from: "£".to_string(),
            to: "₩".to_string(),
            rate,
        }
    }
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([£$€¥₩])(\d[\d,]*)")
            .unwrap_or_else(|e| panic!("invalid price pattern: {e}"))
    })
}

pub fn resolve(price: &str) -> PriceBreakdown {
    resolve_with(price, None)
}

/// Parses up to two currency amounts out of free-form price text. Each amount gets
/// its own deposit and balance; the conversion only applies to single-currency text.
pub fn resolve_with(price: &str, conversion: Option<&Conversion>) -> PriceBreakdown {
    let mut found: Vec<(String, i64)> = Vec::new();

    for caps in price_pattern().captures_iter(price) {
        let symbol = &caps[1];
        let digits: String = caps[2].chars().filter(|c| *c != ',').collect();
        let Ok(total) = digits.parse::<i64>() else {
            continue;
        };
        if found.iter().any(|(s, _)| s == symbol) {
            continue;
        }
        found.push((symbol.to_string(), total));
        if found.len() == 2 {
            break;
        }
    }

    let mut amounts = found.into_iter().map(|(symbol, total)| split(&symbol, total));
    let Some(primary) = amounts.next() else {
        return PriceBreakdown::Unparsed {
            raw: price.to_string(),
        };
    };

    if let Some(secondary) = amounts.next() {
        return PriceBreakdown::Parsed {
            primary,
            secondary: Some(secondary),
            converted: false,
        };
    }

    let secondary = conversion
        .filter(|c| c.from == primary.symbol && c.rate > 0)
        .and_then(|c| primary.total.checked_mul(c.rate).map(|t| split(&c.to, t)));
    let converted = secondary.is_some();

    PriceBreakdown::Parsed {
        primary,
        secondary,
        converted,
    }
}

fn split(symbol: &str, total: i64) -> CurrencyAmounts {
    let deposit = deposit_for(total);
    CurrencyAmounts {
        symbol: symbol.to_string(),
        total,
        deposit,
        balance: total - deposit,
    }
}

/// Integer percentage of `total`, rounded half-up.
pub fn deposit_for(total: i64) -> i64 {
    total.saturating_mul(DEPOSIT_PERCENT).saturating_add(50).div_euclid(100)
}
