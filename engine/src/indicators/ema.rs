// Exponential Moving Average (EMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// EMA over a series that only becomes defined part way through, such as
    /// the MACD line. The recurrence is seeded at the first defined value and
    /// runs over the contiguous defined stretch that follows it.
    pub fn calculate_defined(&self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut results = vec![None; series.len()];
        let Some(start) = series.iter().position(Option::is_some) else {
            return results;
        };
        let values: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();
        for (offset, value) in self.calculate(&values).into_iter().enumerate() {
            results[start + offset] = value;
        }
        results
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>> {
        if self.period == 0 || closes.len() < self.period {
            return vec![None; closes.len()];
        }

        let mut results = vec![None; self.period - 1];
        let k = 2.0 / (self.period as f64 + 1.0);

        // Seeded with the simple mean of the first window
        let initial_sum: f64 = closes.iter().take(self.period).sum();
        let mut previous_ema = initial_sum / self.period as f64;
        results.push(Some(previous_ema));

        for close in closes.iter().skip(self.period) {
            let ema = close * k + previous_ema * (1.0 - k);
            results.push(Some(ema));
            previous_ema = ema;
        }
        results
    }
}
