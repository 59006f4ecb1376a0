use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyAmounts {
    pub symbol: String,
    pub total: i64,
    pub deposit: i64,
    pub balance: i64,
}

impl CurrencyAmounts {
    pub fn total_display(&self) -> String {
        format_amount(&self.symbol, self.total)
    }

    pub fn deposit_display(&self) -> String {
        format_amount(&self.symbol, self.deposit)
    }

    pub fn balance_display(&self) -> String {
        format_amount(&self.symbol, self.balance)
    }
}

/// Numeric view of a package's display price. Unparseable price text is carried
/// through verbatim and never turned into numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceBreakdown {
    Unparsed {
        raw: String,
    },
    Parsed {
        primary: CurrencyAmounts,
        secondary: Option<CurrencyAmounts>,
        /// True when `secondary` came from the fixed conversion rate rather than the price text.
        converted: bool,
    },
}

impl PriceBreakdown {
    pub fn is_parseable(&self) -> bool {
        matches!(self, PriceBreakdown::Parsed { .. })
    }

    pub fn total_display(&self) -> String {
        match self {
            PriceBreakdown::Unparsed { raw } => raw.clone(),
            PriceBreakdown::Parsed { .. } => self.join(CurrencyAmounts::total_display),
        }
    }

    pub fn deposit_display(&self) -> String {
        match self {
            PriceBreakdown::Unparsed { .. } => String::new(),
            PriceBreakdown::Parsed { .. } => self.join(CurrencyAmounts::deposit_display),
        }
    }

    pub fn balance_display(&self) -> String {
        match self {
            PriceBreakdown::Unparsed { .. } => String::new(),
            PriceBreakdown::Parsed { .. } => self.join(CurrencyAmounts::balance_display),
        }
    }

    fn join(&self, field: fn(&CurrencyAmounts) -> String) -> String {
        match self {
            PriceBreakdown::Unparsed { raw } => raw.clone(),
            PriceBreakdown::Parsed {
                primary,
                secondary: Some(secondary),
                ..
            } => format!("{} / {}", field(primary), field(secondary)),
            PriceBreakdown::Parsed { primary, .. } => field(primary),
        }
    }
}

/// `format_amount("₩", 500000)` is `"₩500,000"`.
pub fn format_amount(symbol: &str, amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}")
}
