//! Hedge-instrument classification for diversification checks.

/// Hedge-like tickers: long vol plus inverse equity/rates/credit ETFs.
pub const HEDGE_TICKERS: &[&str] = &[
    // Long vol
    "VIXY",
    // Inverse equity ETFs
    "SH", "SDS", "SPXU", "PSQ", "QID", "SQQQ", "RWM", "TWM", "TZA", "DOG", "DXD",
    // Rates / credit inverse
    "TBF", "TMV", "TBT", "SJB",
];

/// Leveraged inverse equity ETFs. Never stack more than one of these.
pub const LEVERED_INVERSE_EQUITY: &[&str] = &[
    "SQQQ", "SPXU", "TZA", "SDS", "QID", "TWM", "DXD", "SDOW", "SOXS", "SRTY", "LABD",
];

pub fn is_hedge_ticker(ticker: &str) -> bool {
    HEDGE_TICKERS.contains(&ticker)
}

pub fn is_levered_inverse_equity(ticker: &str) -> bool {
    LEVERED_INVERSE_EQUITY.contains(&ticker)
}

/// Inverse-ETF proxy for expressing a bearish view in shares.
pub fn inverse_proxy_for(ticker: &str) -> Option<&'static str> {
    match ticker {
        "SPLG" | "SPY" => Some("SH"),
        "QQQM" | "QQQ" => Some("PSQ"),
        "IWM" => Some("RWM"),
        "DIA" => Some("DOG"),
        "TLT" => Some("TBF"),
        "HYG" => Some("SJB"),
        _ => None,
    }
}
