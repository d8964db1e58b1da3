//! OCC-style option symbol parsing.
//!
//! Symbols encode `<UNDERLYING><YYMMDD><C|P><8-digit strike x1000>`,
//! e.g. `GOOG251219C00355000` → GOOG, 2025-12-19, call, 355.000.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::OptionRight;

/// Failure to parse an OCC-style option symbol.
#[derive(Debug, Error)]
pub enum OccParseError {
    #[error("symbol {symbol} does not start with underlying {underlying}")]
    WrongUnderlying { symbol: String, underlying: String },

    #[error("symbol {0} too short to be OCC-style (YYMMDD + C/P + 8-digit strike)")]
    TooShort(String),

    #[error("unknown call/put code '{code}' in symbol {symbol}")]
    BadRight { symbol: String, code: char },

    #[error("invalid {what} digits in symbol {symbol}")]
    BadDigits { symbol: String, what: &'static str },

    #[error("invalid expiry date in symbol {0}")]
    BadDate(String),
}

/// Parse an OCC-style option symbol against a known underlying.
///
/// Returns `(expiry, right, strike)`.
pub fn parse_occ_option_symbol(
    symbol: &str,
    underlying: &str,
) -> Result<(NaiveDate, OptionRight, Decimal), OccParseError> {
    let Some(rest) = symbol.strip_prefix(underlying) else {
        return Err(OccParseError::WrongUnderlying {
            symbol: symbol.to_string(),
            underlying: underlying.to_string(),
        });
    };

    if rest.len() < 6 + 1 + 8 {
        return Err(OccParseError::TooShort(symbol.to_string()));
    }
    if !rest.is_ascii() {
        return Err(OccParseError::BadDigits {
            symbol: symbol.to_string(),
            what: "symbol",
        });
    }

    let date_code = &rest[..6];
    let cp_code = rest.as_bytes()[6] as char;
    let strike_code = &rest[7..15];

    let parse2 = |s: &str, what: &'static str| -> Result<u32, OccParseError> {
        s.parse::<u32>().map_err(|_| OccParseError::BadDigits {
            symbol: symbol.to_string(),
            what,
        })
    };

    let year = 2000 + parse2(&date_code[0..2], "year")?;
    let month = parse2(&date_code[2..4], "month")?;
    let day = parse2(&date_code[4..6], "day")?;
    let expiry = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| OccParseError::BadDate(symbol.to_string()))?;

    let right = match cp_code {
        'C' => OptionRight::Call,
        'P' => OptionRight::Put,
        other => {
            return Err(OccParseError::BadRight {
                symbol: symbol.to_string(),
                code: other,
            })
        }
    };

    let strike_thousandths: i64 = strike_code
        .parse()
        .map_err(|_| OccParseError::BadDigits {
            symbol: symbol.to_string(),
            what: "strike",
        })?;
    let strike = Decimal::new(strike_thousandths, 3);

    Ok((expiry, right, strike))
}

/// Extract the underlying ticker from a symbol: the leading alphabetic run.
///
/// OCC option symbols embed the underlying as a prefix before the 6-digit
/// date code; a pure equity symbol passes through unchanged.
pub fn extract_underlying(symbol: &str) -> Option<String> {
    let s = symbol.trim().to_uppercase();
    if s.is_empty() {
        return None;
    }
    let prefix: String = s.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if prefix.is_empty() {
        Some(s)
    } else {
        Some(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_standard_symbol() {
        let (expiry, right, strike) = parse_occ_option_symbol("GOOG251219C00355000", "GOOG").unwrap();
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2025, 12, 19).unwrap());
        assert_eq!(right, OptionRight::Call);
        assert_eq!(strike, dec!(355.000));
    }

    #[test]
    fn parses_put_with_fractional_strike() {
        let (expiry, right, strike) = parse_occ_option_symbol("IEF260227P00095500", "IEF").unwrap();
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
        assert_eq!(right, OptionRight::Put);
        assert_eq!(strike, dec!(95.500));
    }

    #[test]
    fn rejects_wrong_underlying() {
        let err = parse_occ_option_symbol("GOOG251219C00355000", "MSFT").unwrap_err();
        assert!(matches!(err, OccParseError::WrongUnderlying { .. }));
    }

    #[test]
    fn rejects_short_remainder() {
        let err = parse_occ_option_symbol("GOOG251219C", "GOOG").unwrap_err();
        assert!(matches!(err, OccParseError::TooShort(_)));
    }

    #[test]
    fn rejects_bad_right_code() {
        let err = parse_occ_option_symbol("GOOG251219X00355000", "GOOG").unwrap_err();
        assert!(matches!(err, OccParseError::BadRight { code: 'X', .. }));
    }

    #[test]
    fn extracts_option_underlying() {
        assert_eq!(extract_underlying("VIXY260220C00028000").as_deref(), Some("VIXY"));
    }

    #[test]
    fn equity_symbol_passes_through() {
        assert_eq!(extract_underlying("AAPL").as_deref(), Some("AAPL"));
    }

    #[test]
    fn empty_symbol_is_none() {
        assert_eq!(extract_underlying(""), None);
        assert_eq!(extract_underlying("   "), None);
    }
}
