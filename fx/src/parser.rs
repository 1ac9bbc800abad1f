//! Parser for the daily PTAX closing file.
//!
//! Each line is `date;numeric code;kind;currency;buy;sell;buy parity;sell parity`
//! with `DD/MM/YYYY` dates and comma decimal separators. There is no header.
//! Lines that do not fit the format are skipped; a body with no valid lines
//! yields an empty [`RateSet`].

use std::str::FromStr;

use ptax_common::{parse_feed_date, Currency, CurrencyKind, PtaxRate, RateSet};
use rust_decimal::Decimal;
use tracing::trace;

/// Minimum number of `;`-separated fields in a record.
const MIN_FIELDS: usize = 8;

/// Parse a feed body into the records it contains, in file order.
pub fn parse_feed(text: &str) -> RateSet {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                trace!(line = %line, "Skipping unrecognised feed line");
            }
            parsed
        })
        .collect()
}

/// Parse one record, `None` if the line is not a valid quote.
pub fn parse_line(line: &str) -> Option<PtaxRate> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let kind = CurrencyKind::from_str(fields[2]).ok()?;
    let date = parse_feed_date(fields[0]).ok()?;
    let numeric_code = fields[1].trim().parse::<u32>().ok()?;
    let currency = Currency::new(fields[3]);
    if currency.code().is_empty() {
        return None;
    }

    let buy_rate = parse_decimal(fields[4])?;
    let sell_rate = parse_decimal(fields[5])?;
    if buy_rate <= Decimal::ZERO || sell_rate <= Decimal::ZERO {
        return None;
    }

    Some(PtaxRate {
        date,
        numeric_code,
        kind,
        currency,
        buy_rate,
        sell_rate,
        buy_parity: parse_decimal(fields[6])?,
        sell_parity: parse_decimal(fields[7])?,
    })
}

/// Parse a comma-decimal number such as `5,39230000`.
fn parse_decimal(field: &str) -> Option<Decimal> {
    Decimal::from_str(&field.trim().replace(',', ".")).ok()
}
