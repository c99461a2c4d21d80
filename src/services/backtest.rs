//! Backtest Service
//!
//! Produces the placeholder result shown on the backtesting page. Performance
//! figures are fixed; only the equity curve and trade list are scaled to the
//! requested capital. No strategy is executed.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{
    BacktestConfig, BacktestPerformance, BacktestResult, EquityPoint, Trade, TradeSide,
};
use crate::services::market_data::mock_bars;

pub fn mock_performance() -> BacktestPerformance {
    BacktestPerformance {
        total_return: 12.35,
        sharpe_ratio: 1.42,
        max_drawdown: -15.3,
        win_rate: 67.8,
        profit_factor: 2.14,
        total_trades: 156,
        winning_trades: 106,
        losing_trades: 50,
        avg_winning_trade: 19.82,
        avg_losing_trade: -17.33,
    }
}

pub fn run_mock_backtest(config: BacktestConfig) -> Result<BacktestResult> {
    let bars = mock_bars()?;
    let first_close = bars.first().map(|(_, bar)| bar.close).unwrap_or(1.0);

    let equity = bars
        .iter()
        .map(|(day, bar)| EquityPoint {
            date: day.to_string(),
            value: round2(config.initial_capital * bar.close / first_close),
        })
        .collect();

    let trades = bars
        .windows(2)
        .map(|pair| {
            let (entry_day, entry) = &pair[0];
            let (exit_day, exit) = &pair[1];
            let quantity = if entry.close > 0.0 {
                (config.initial_capital / entry.close).floor()
            } else {
                0.0
            };
            let side = if exit.close >= entry.close { TradeSide::Long } else { TradeSide::Short };
            let move_per_unit = match side {
                TradeSide::Long => exit.close - entry.close,
                TradeSide::Short => entry.close - exit.close,
            };
            let commission = round2(quantity * entry.close * config.commission);
            let pnl = round2(quantity * move_per_unit - commission);
            let pnl_percent = if entry.close > 0.0 {
                round2(move_per_unit / entry.close * 100.0)
            } else {
                0.0
            };

            Trade {
                id: Uuid::new_v4(),
                entry_date: entry_day.to_string(),
                exit_date: exit_day.to_string(),
                entry_price: entry.close,
                exit_price: exit.close,
                quantity,
                side,
                pnl,
                pnl_percent,
                commission,
            }
        })
        .collect();

    Ok(BacktestResult {
        id: Uuid::new_v4(),
        strategy_id: config.strategy_id,
        config,
        performance: mock_performance(),
        equity,
        trades,
        created_at: Utc::now(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(capital: f64) -> BacktestConfig {
        BacktestConfig {
            strategy_id: Uuid::new_v4(),
            symbol: "BTCUSDT".to_string(),
            timeframe: "1D".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            initial_capital: capital,
            commission: 0.0,
            slippage: 0.0,
            parameters: None,
        }
    }

    #[test]
    fn test_equity_curve_starts_at_capital() {
        let result = run_mock_backtest(config(10_000.0)).unwrap();

        assert_eq!(result.equity.len(), 3);
        assert_eq!(result.equity[0].value, 10_000.0);
        assert_eq!(result.equity[0].date, "2024-01-01");
        assert_eq!(result.performance.total_trades, 156);
    }

    #[test]
    fn test_trades_follow_price_direction() {
        let result = run_mock_backtest(config(1_030.0)).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].side, TradeSide::Long);
        assert_eq!(result.trades[0].quantity, 10.0);
        assert_eq!(result.trades[0].pnl, 40.0);
        assert_eq!(result.trades[1].side, TradeSide::Short);
    }
}
