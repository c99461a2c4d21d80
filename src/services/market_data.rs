//! Market Data Service
//!
//! Static price bars served to the charting views. No exchange is queried.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};

use crate::database::models::{MarketData, Ohlc};

pub const SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT", "EURUSD", "AAPL", "SPY"];

/// (date, open, high, low, close, volume)
const MOCK_BARS: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("2024-01-01", 100.0, 105.0, 98.0, 103.0, 1000.0),
    ("2024-01-02", 103.0, 108.0, 102.0, 107.0, 1200.0),
    ("2024-01-03", 107.0, 110.0, 105.0, 106.0, 800.0),
];

pub fn is_known_symbol(symbol: &str) -> bool {
    SYMBOLS.iter().any(|known| known.eq_ignore_ascii_case(symbol))
}

/// Mock bars as (ISO date, bar) pairs
pub fn mock_bars() -> Result<Vec<(NaiveDate, Ohlc)>> {
    MOCK_BARS
        .iter()
        .map(|&(date, open, high, low, close, volume)| {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid mock bar date {}", date))?;
            let timestamp = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
            Ok((day, Ohlc { timestamp, open, high, low, close, volume }))
        })
        .collect()
}

/// Bars for `symbol` between the optional inclusive date bounds
pub fn load_market_data(
    symbol: &str,
    timeframe: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<MarketData> {
    let data = mock_bars()?
        .into_iter()
        .filter(|(day, _)| from.is_none_or(|from| *day >= from))
        .filter(|(day, _)| to.is_none_or(|to| *day <= to))
        .map(|(_, bar)| bar)
        .collect();

    Ok(MarketData {
        symbol: symbol.to_uppercase(),
        timeframe: timeframe.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_bounds_filter_bars() {
        let all = load_market_data("btcusdt", "1D", None, None).unwrap();
        assert_eq!(all.symbol, "BTCUSDT");
        assert_eq!(all.data.len(), 3);

        let from = NaiveDate::from_ymd_opt(2024, 1, 2);
        let window = load_market_data("BTCUSDT", "1D", from, from).unwrap();
        assert_eq!(window.data.len(), 1);
        assert_eq!(window.data[0].close, 107.0);
    }

    #[test]
    fn test_known_symbols() {
        assert!(is_known_symbol("ethusdt"));
        assert!(!is_known_symbol("DOGE"));
    }
}
