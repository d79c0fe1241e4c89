// Moving Average Convergence Divergence (MACD) indicator implementation
//
// MACD        = EMA(fast) - EMA(slow)
// Signal line = EMA(signal) of the MACD line
use super::{Ema, IndicatorCalculator};
use serde_json::Value;

/// MACD and signal line, one entry per input close.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub struct Macd {
    name: String,
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            name: format!("MACD({},{},{})", fast_period, slow_period, signal_period),
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            signal: Ema::new(signal_period),
        }
    }

    pub fn calculate_lines(&self, closes: &[f64]) -> MacdLines {
        let fast = self.fast.calculate(closes);
        let slow = self.slow.calculate(closes);

        let macd: Vec<Option<f64>> = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();
        let signal = self.signal.calculate_defined(&macd);

        MacdLines { macd, signal }
    }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "fast": self.fast.period(),
            "slow": self.slow.period(),
            "signal": self.signal.period(),
        })
    }

    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>> {
        self.calculate_lines(closes).macd
    }
}
