// Relative Strength Index (RSI) indicator implementation, Wilder's smoothing
use super::IndicatorCalculator;
use serde_json::Value;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            // No losses in the window: RSI is pinned at 100
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    fn gain_loss(change: f64) -> (f64, f64) {
        (change.max(0.0), (-change).max(0.0))
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>> {
        if self.period == 0 || closes.len() <= self.period {
            return vec![None; closes.len()];
        }

        let mut results = vec![None; self.period]; // RSI needs 'period' initial changes

        let mut gains = 0.0;
        let mut losses = 0.0;
        for i in 1..=self.period {
            let (gain, loss) = Self::gain_loss(closes[i] - closes[i - 1]);
            gains += gain;
            losses += loss;
        }

        let period = self.period as f64;
        let mut avg_gain = gains / period;
        let mut avg_loss = losses / period;
        results.push(Some(Self::rsi_from_averages(avg_gain, avg_loss)));

        for i in (self.period + 1)..closes.len() {
            let (gain, loss) = Self::gain_loss(closes[i] - closes[i - 1]);
            avg_gain = (avg_gain * (period - 1.0) + gain) / period;
            avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            results.push(Some(Self::rsi_from_averages(avg_gain, avg_loss)));
        }
        results
    }
}
