//! Currency and PTAX rate types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Currency code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this is the feed's base currency.
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    /// Brazilian real, the currency every PTAX rate is quoted in.
    pub fn brl() -> Self {
        Self::new(BASE_CURRENCY)
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }
}

/// Code of the currency all PTAX quotes are expressed in.
pub const BASE_CURRENCY: &str = "BRL";

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Upstream quotation class of a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    /// Type A: quoted as units of the currency per US dollar.
    A,
    /// Type B: quoted as US dollars per unit of the currency.
    B,
}

impl CurrencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyKind::A => "A",
            CurrencyKind::B => "B",
        }
    }
}

impl FromStr for CurrencyKind {
    type Err = ParseError;

    /// Exact match only; lowercase or padded values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(CurrencyKind::A),
            "B" => Ok(CurrencyKind::B),
            other => Err(ParseError::InvalidCurrencyKind(other.to_string())),
        }
    }
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the quoted spread to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    /// Buy rate (taxa de compra).
    Buy,
    /// Sell rate (taxa de venda).
    #[default]
    Sell,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKind::Buy => "buy",
            RateKind::Sell => "sell",
        }
    }
}

impl FromStr for RateKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(RateKind::Buy),
            "sell" => Ok(RateKind::Sell),
            _ => Err(ParseError::InvalidRateKind(s.to_string())),
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One currency's PTAX quote for one date.
///
/// Buy and sell rates are BRL per unit of the foreign currency. Parities are
/// the upstream's US dollar cross references and are carried as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtaxRate {
    /// Date of the quote.
    pub date: NaiveDate,
    /// Upstream numeric currency code.
    pub numeric_code: u32,
    /// Quotation class.
    pub kind: CurrencyKind,
    /// Currency code (e.g. USD).
    pub currency: Currency,
    /// Buy rate (BRL per unit).
    pub buy_rate: Decimal,
    /// Sell rate (BRL per unit).
    pub sell_rate: Decimal,
    /// Buy parity.
    pub buy_parity: Decimal,
    /// Sell parity.
    pub sell_parity: Decimal,
}

impl PtaxRate {
    /// Get the rate for the requested side of the spread.
    pub fn rate(&self, kind: RateKind) -> Decimal {
        match kind {
            RateKind::Buy => self.buy_rate,
            RateKind::Sell => self.sell_rate,
        }
    }

    /// Case-insensitive match on the currency code.
    pub fn is_currency(&self, code: &str) -> bool {
        self.currency.code().eq_ignore_ascii_case(code.trim())
    }
}

/// Rates published for a single date, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSet {
    rates: Vec<PtaxRate>,
}

impl RateSet {
    /// Create a rate set from records.
    pub fn new(rates: Vec<PtaxRate>) -> Self {
        Self { rates }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PtaxRate> {
        self.rates.iter()
    }

    pub fn as_slice(&self) -> &[PtaxRate] {
        &self.rates
    }

    /// Date of the first record, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        self.rates.first().map(|r| r.date)
    }

    /// First record whose code matches, ignoring case.
    pub fn find(&self, code: &str) -> Option<&PtaxRate> {
        self.rates.iter().find(|r| r.is_currency(code))
    }

    /// Currency codes in ascending order.
    pub fn currencies(&self) -> Vec<Currency> {
        let mut codes: Vec<Currency> = self.rates.iter().map(|r| r.currency.clone()).collect();
        codes.sort();
        codes
    }

    pub fn into_vec(self) -> Vec<PtaxRate> {
        self.rates
    }
}

impl FromIterator<PtaxRate> for RateSet {
    fn from_iter<I: IntoIterator<Item = PtaxRate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for RateSet {
    type Item = PtaxRate;
    type IntoIter = std::vec::IntoIter<PtaxRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.into_iter()
    }
}

impl<'a> IntoIterator for &'a RateSet {
    type Item = &'a PtaxRate;
    type IntoIter = std::slice::Iter<'a, PtaxRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_rate(code: &str, buy: Decimal, sell: Decimal) -> PtaxRate {
        PtaxRate {
            date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            numeric_code: 220,
            kind: CurrencyKind::A,
            currency: Currency::new(code),
            buy_rate: buy,
            sell_rate: sell,
            buy_parity: dec!(1),
            sell_parity: dec!(1),
        }
    }

    #[test]
    fn test_currency_normalizes_case() {
        assert_eq!(Currency::new("usd"), Currency::usd());
        assert_eq!(Currency::new(" brl ").code(), "BRL");
        assert_eq!(Currency::new("brl"), Currency::brl());
        assert!(Currency::brl().is_base());
        assert!(!Currency::eur().is_base());
    }

    #[test]
    fn test_deserialized_currency_is_normalized() {
        let currency: Currency = serde_json::from_str("\" brl\"").unwrap();
        assert_eq!(currency, Currency::brl());
        assert!(currency.is_base());
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"BRL\"");

        let rate: PtaxRate = serde_json::from_value(serde_json::json!({
            "date": "2025-12-15",
            "numeric_code": 220,
            "kind": "A",
            "currency": "usd",
            "buy_rate": "5.00",
            "sell_rate": "5.10",
            "buy_parity": "1",
            "sell_parity": "1",
        }))
        .unwrap();
        assert_eq!(rate.currency, Currency::usd());
    }

    #[test]
    fn test_currency_kind_parse() {
        assert_eq!("A".parse::<CurrencyKind>().unwrap(), CurrencyKind::A);
        assert_eq!("B".parse::<CurrencyKind>().unwrap(), CurrencyKind::B);
        assert!("a".parse::<CurrencyKind>().is_err());
        assert!("C".parse::<CurrencyKind>().is_err());
    }

    #[test]
    fn test_rate_kind_parse_and_default() {
        assert_eq!(RateKind::default(), RateKind::Sell);
        assert_eq!("BUY".parse::<RateKind>().unwrap(), RateKind::Buy);
        assert_eq!("sell".parse::<RateKind>().unwrap(), RateKind::Sell);
        assert_eq!(
            "mid".parse::<RateKind>(),
            Err(ParseError::InvalidRateKind("mid".to_string()))
        );
    }

    #[test]
    fn test_rate_side_selection() {
        let rate = make_rate("USD", dec!(5.00), dec!(5.10));
        assert_eq!(rate.rate(RateKind::Buy), dec!(5.00));
        assert_eq!(rate.rate(RateKind::Sell), dec!(5.10));
    }

    #[test]
    fn test_find_is_case_insensitive_first_match() {
        let set = RateSet::new(vec![
            make_rate("USD", dec!(5.00), dec!(5.10)),
            make_rate("usd", dec!(9.00), dec!(9.10)),
        ]);

        let found = set.find("Usd").unwrap();
        assert_eq!(found.sell_rate, dec!(5.10));
        assert!(set.find("XYZ").is_none());
    }

    #[test]
    fn test_currencies_sorted() {
        let set: RateSet = vec![
            make_rate("USD", dec!(5.00), dec!(5.10)),
            make_rate("EUR", dec!(6.00), dec!(6.12)),
            make_rate("CHF", dec!(6.50), dec!(6.60)),
        ]
        .into_iter()
        .collect();

        let codes: Vec<String> = set.currencies().iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, vec!["CHF", "EUR", "USD"]);
        assert_eq!(set.date(), NaiveDate::from_ymd_opt(2025, 12, 15));
    }

    #[test]
    fn test_empty_set_has_no_date() {
        let set = RateSet::default();
        assert!(set.is_empty());
        assert_eq!(set.date(), None);
    }
}
