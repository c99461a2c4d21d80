//! Canned PineScript strategies used when no language model is configured.

use serde_json::json;

use crate::database::models::StrategyParameter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    TrendFollowing,
    MeanReversion,
    Scalping,
}

impl TemplateKind {
    /// French phrase completing "Elle utilise ... pour ..."
    pub fn purpose(self) -> &'static str {
        match self {
            Self::TrendFollowing => "suivre les tendances",
            Self::MeanReversion => "profiter des retours à la moyenne",
            Self::Scalping => "faire du scalping",
        }
    }
}

pub struct StrategyTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub pine_script: &'static str,
    pub parameters: Vec<StrategyParameter>,
}

pub fn template(kind: TemplateKind) -> StrategyTemplate {
    match kind {
        TemplateKind::TrendFollowing => StrategyTemplate {
            name: "Stratégie de Suivi de Tendance IA",
            description: "Stratégie générée par IA pour suivre les tendances du marché avec des signaux d'entrée optimisés",
            pine_script: TREND_SCRIPT,
            parameters: vec![
                StrategyParameter::number("fast_length", json!(12), 5.0, 50.0, "Période de la moyenne mobile rapide"),
                StrategyParameter::number("slow_length", json!(26), 20.0, 100.0, "Période de la moyenne mobile lente"),
            ],
        },
        TemplateKind::MeanReversion => StrategyTemplate {
            name: "Stratégie de Retour à la Moyenne IA",
            description: "Stratégie IA pour profiter des retours à la moyenne avec Bollinger Bands",
            pine_script: MEAN_REVERSION_SCRIPT,
            parameters: vec![
                StrategyParameter::number("bb_length", json!(20), 10.0, 50.0, "Période des Bollinger Bands"),
            ],
        },
        TemplateKind::Scalping => StrategyTemplate {
            name: "Stratégie de Scalping IA",
            description: "Stratégie IA optimisée pour le scalping avec signaux rapides",
            pine_script: SCALPING_SCRIPT,
            parameters: vec![
                StrategyParameter::number("ema_fast", json!(5), 3.0, 15.0, "Période EMA rapide"),
            ],
        },
    }
}

/// Revision returned by the improve endpoint whatever the feedback
pub fn improved_template() -> StrategyTemplate {
    StrategyTemplate {
        name: "Stratégie Améliorée",
        description: "Version améliorée basée sur vos commentaires",
        pine_script: IMPROVED_SCRIPT,
        parameters: vec![
            StrategyParameter::number("length", json!(21), 10.0, 50.0, "Période pour le calcul"),
        ],
    }
}

const TREND_SCRIPT: &str = r#"// AI Generated Trend Following Strategy
//@version=5
strategy("AI Trend Strategy", overlay=true)

// Parameters
fast_length = input(12, "Fast MA Length")
slow_length = input(26, "Slow MA Length")
rsi_length = input(14, "RSI Length")

// Indicators
fast_ma = ta.sma(close, fast_length)
slow_ma = ta.sma(close, slow_length)
rsi = ta.rsi(close, rsi_length)

// Entry conditions
long_condition = ta.crossover(fast_ma, slow_ma) and rsi > 50
short_condition = ta.crossunder(fast_ma, slow_ma) and rsi < 50

// Execute trades
if long_condition
    strategy.entry("Long", strategy.long)
if short_condition
    strategy.entry("Short", strategy.short)

// Plot indicators
plot(fast_ma, color=color.blue, title="Fast MA")
plot(slow_ma, color=color.red, title="Slow MA")"#;

const MEAN_REVERSION_SCRIPT: &str = r#"// AI Generated Mean Reversion Strategy
//@version=5
strategy("AI Mean Reversion", overlay=true)

// Parameters
bb_length = input(20, "Bollinger Bands Length")
bb_mult = input(2.0, "Bollinger Bands Multiplier")
rsi_length = input(14, "RSI Length")

// Bollinger Bands
basis = ta.sma(close, bb_length)
dev = bb_mult * ta.stdev(close, bb_length)
upper = basis + dev
lower = basis - dev

// RSI
rsi = ta.rsi(close, rsi_length)

// Entry conditions
long_condition = close <= lower and rsi < 30
short_condition = close >= upper and rsi > 70

// Exit conditions
long_exit = close >= basis
short_exit = close <= basis

// Execute trades
if long_condition
    strategy.entry("Long", strategy.long)
if short_condition
    strategy.entry("Short", strategy.short)

if long_exit
    strategy.close("Long")
if short_exit
    strategy.close("Short")

// Plot Bollinger Bands
plot(basis, color=color.orange, title="BB Basis")
plot(upper, color=color.red, title="BB Upper")
plot(lower, color=color.green, title="BB Lower")"#;

const SCALPING_SCRIPT: &str = r#"// AI Generated Scalping Strategy
//@version=5
strategy("AI Scalping", overlay=true)

// Parameters
ema_fast = input(5, "Fast EMA")
ema_slow = input(13, "Slow EMA")
rsi_length = input(7, "RSI Length")

// Indicators
ema_f = ta.ema(close, ema_fast)
ema_s = ta.ema(close, ema_slow)
rsi = ta.rsi(close, rsi_length)

// Entry conditions
long_condition = ta.crossover(ema_f, ema_s) and rsi > 40
short_condition = ta.crossunder(ema_f, ema_s) and rsi < 60

// Quick exits for scalping
long_exit = ta.crossunder(ema_f, ema_s) or rsi > 80
short_exit = ta.crossover(ema_f, ema_s) or rsi < 20

// Execute trades
if long_condition
    strategy.entry("Long", strategy.long)
if short_condition
    strategy.entry("Short", strategy.short)

if long_exit
    strategy.close("Long")
if short_exit
    strategy.close("Short")

// Plot EMAs
plot(ema_f, color=color.blue, title="Fast EMA")
plot(ema_s, color=color.red, title="Slow EMA")"#;

/// Declares `rsi` itself; the entry conditions read it.
const IMPROVED_SCRIPT: &str = r#"// Improved Strategy
//@version=5
strategy("Improved Strategy", overlay=true)

// Enhanced parameters based on feedback
length = input(21, "Period")
multiplier = input(2.0, "Multiplier")
rsi = ta.rsi(close, 14)

// Improved logic
basis = ta.sma(close, length)
dev = multiplier * ta.stdev(close, length)
upper = basis + dev
lower = basis - dev

// Better entry conditions
long_condition = ta.crossover(close, lower) and rsi > 30
short_condition = ta.crossunder(close, upper) and rsi < 70

if long_condition
    strategy.entry("Long", strategy.long)
if short_condition
    strategy.entry("Short", strategy.short)"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_is_a_v5_strategy() {
        for kind in [TemplateKind::TrendFollowing, TemplateKind::MeanReversion, TemplateKind::Scalping] {
            let t = template(kind);
            assert!(t.pine_script.contains("//@version=5"), "{:?}", kind);
            assert!(t.pine_script.contains("strategy("), "{:?}", kind);
            assert!(!t.parameters.is_empty(), "{:?}", kind);
        }
        assert!(improved_template().pine_script.contains("//@version=5"));
    }

    #[test]
    fn test_improved_script_declares_rsi_before_use() {
        let script = improved_template().pine_script;
        let declared = script.find("rsi = ta.rsi(close, 14)").unwrap();
        let used = script.find("and rsi > 30").unwrap();
        assert!(declared < used);
    }
}
