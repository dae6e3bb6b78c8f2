use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Whether a currency code is a fiat currency or a cryptocurrency.
/// Determines which rate provider answers for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    /// Fiat currencies (USD, EUR, KRW, ...) — Frankfurter
    Fiat,
    /// Cryptocurrencies (BTC, ETH, XRP) — CoinGecko
    Crypto,
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyKind::Fiat => write!(f, "Fiat"),
            CurrencyKind::Crypto => write!(f, "Crypto"),
        }
    }
}

/// Supported cryptocurrencies and their CoinGecko ids.
pub const CRYPTO_IDS: [(&str, &str); 3] = [("BTC", "bitcoin"), ("ETH", "ethereum"), ("XRP", "ripple")];

/// An upper-cased currency code such as `USD` or `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Accepts 3-5 ASCII letters, case-insensitive.
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        let upper = code.trim().to_uppercase();
        if !(3..=5).contains(&upper.len()) || !upper.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{code}': expected 3-5 ASCII letters (e.g., USD, KRW, BTC)"
            )));
        }
        Ok(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> CurrencyKind {
        if self.coingecko_id().is_some() {
            CurrencyKind::Crypto
        } else {
            CurrencyKind::Fiat
        }
    }

    pub fn is_crypto(&self) -> bool {
        self.kind() == CurrencyKind::Crypto
    }

    /// CoinGecko id for crypto codes, `None` for fiat.
    pub fn coingecko_id(&self) -> Option<&'static str> {
        CRYPTO_IDS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, id)| *id)
    }

    /// CoinGecko `vs_currency` spelling: the lower-cased ticker (`krw`, `eth`).
    pub fn vs_currency(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A single daily rate point (date → units of `to` per unit of `from`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Result of one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub converted: f64,
}

impl Conversion {
    /// `1,000 USD ≈ 1,380,512.5 KRW`; crypto targets keep up to 8 fraction digits.
    pub fn describe(&self) -> String {
        if self.from == self.to {
            return format!("{} {}", format_decimal(self.amount, 8), self.from);
        }
        let digits = if self.to.is_crypto() { 8 } else { 2 };
        format!(
            "{} {} ≈ {} {}",
            format_decimal(self.amount, 8),
            self.from,
            format_decimal(self.converted, digits),
            self.to
        )
    }
}

/// Thousands separators plus at most `max_fraction` fraction digits,
/// trailing zeros dropped.
pub fn format_decimal(value: f64, max_fraction: usize) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (fixed.clone(), String::new()),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
