// Technical indicators module
pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::Ema;
pub use macd::{Macd, MacdLines};
pub use rsi::Rsi;

use serde_json::Value;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    /// One entry per input value; `None` where the indicator is not yet defined.
    fn calculate(&self, closes: &[f64]) -> Vec<Option<f64>>;
}
