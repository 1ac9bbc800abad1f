//! Currency conversion over a resolved PTAX rate set.
//!
//! Every PTAX quote is BRL per unit of foreign currency, so BRL is the pivot:
//! foreign amounts are multiplied into BRL and BRL amounts are divided out.
//! Conversions between two foreign currencies go through BRL and report the
//! implied cross rate.

use chrono::NaiveDate;
use ptax_common::{Currency, PtaxRate, RateKind, RateSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PtaxError, PtaxResult};

/// Result of a currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Input amount.
    pub amount: Decimal,
    /// Converted amount, unrounded.
    pub result: Decimal,
    /// Effective rate applied.
    pub rate: Decimal,
    /// Side of the spread used.
    pub rate_kind: RateKind,
    /// Date of the quote used.
    pub date: NaiveDate,
}

/// Request to perform a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub from: Currency,
    pub to: Currency,
    pub rate_kind: RateKind,
}

impl ConversionRequest {
    /// Create a request using the sell rate.
    pub fn new(amount: Decimal, from: impl Into<Currency>, to: impl Into<Currency>) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
            rate_kind: RateKind::Sell,
        }
    }

    /// Use the buy rate.
    pub fn at_buy(mut self) -> Self {
        self.rate_kind = RateKind::Buy;
        self
    }

    /// Use the sell rate.
    pub fn at_sell(mut self) -> Self {
        self.rate_kind = RateKind::Sell;
        self
    }

    pub fn with_rate_kind(mut self, kind: RateKind) -> Self {
        self.rate_kind = kind;
        self
    }
}

/// Look up a currency in a rate set.
pub fn find_rate<'a>(rates: &'a RateSet, code: &str) -> PtaxResult<&'a PtaxRate> {
    rates
        .find(code)
        .ok_or_else(|| PtaxError::CurrencyNotFound(code.trim().to_uppercase()))
}

/// Convert using `rates`; `today` dates identity conversions over an empty set.
pub fn convert(
    rates: &RateSet,
    request: &ConversionRequest,
    today: NaiveDate,
) -> PtaxResult<Conversion> {
    let from = &request.from;
    let to = &request.to;
    let kind = request.rate_kind;

    let (result, rate, date) = if from == to {
        (request.amount, Decimal::ONE, rates.date().unwrap_or(today))
    } else if from.is_base() {
        let target = find_rate(rates, to.code())?;
        let rate = target.rate(kind);
        (divide(request, request.amount, rate, target)?, rate, target.date)
    } else if to.is_base() {
        let source = find_rate(rates, from.code())?;
        let rate = source.rate(kind);
        (multiply(request, rate)?, rate, source.date)
    } else {
        let source = find_rate(rates, from.code())?;
        let target = find_rate(rates, to.code())?;
        let source_rate = source.rate(kind);
        let target_rate = target.rate(kind);
        let brl = multiply(request, source_rate)?;
        (
            divide(request, brl, target_rate, target)?,
            divide(request, source_rate, target_rate, target)?,
            source.date,
        )
    };

    Ok(Conversion {
        from: from.clone(),
        to: to.clone(),
        amount: request.amount,
        result,
        rate,
        rate_kind: kind,
        date,
    })
}

fn overflow(request: &ConversionRequest) -> PtaxError {
    PtaxError::AmountOverflow {
        from: request.from.to_string(),
        to: request.to.to_string(),
        amount: request.amount,
    }
}

fn multiply(request: &ConversionRequest, rate: Decimal) -> PtaxResult<Decimal> {
    request
        .amount
        .checked_mul(rate)
        .ok_or_else(|| overflow(request))
}

/// Zero divisors are a bad rate; any other failure is an out-of-range quotient.
fn divide(
    request: &ConversionRequest,
    value: Decimal,
    rate: Decimal,
    record: &PtaxRate,
) -> PtaxResult<Decimal> {
    if rate.is_zero() {
        return Err(PtaxError::InvalidRate {
            currency: record.currency.to_string(),
            rate,
        });
    }
    value.checked_div(rate).ok_or_else(|| overflow(request))
}
