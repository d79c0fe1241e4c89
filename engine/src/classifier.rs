// Maps the latest aligned indicator row to a Buy / Sell / Hold signal.
use crate::config::Thresholds;
use crate::error::EngineError;
use shared::models::{IndicatorRow, Signal, TradeSignal};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalClassifier {
    thresholds: Thresholds,
}

impl SignalClassifier {
    pub fn new(thresholds: Thresholds) -> Result<Self, EngineError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Rules, first match wins, all comparisons strict:
    /// 1. `macd > signal_line && rsi < overbought` is Buy
    /// 2. `macd < signal_line && rsi > oversold` is Sell
    /// 3. anything else, including `macd == signal_line`, is Hold
    pub fn classify(&self, row: &IndicatorRow) -> TradeSignal {
        let Thresholds { overbought, oversold } = self.thresholds;
        let signal = if row.macd > row.signal_line && row.rsi < overbought {
            Signal::Buy
        } else if row.macd < row.signal_line && row.rsi > oversold {
            Signal::Sell
        } else {
            Signal::Hold
        };
        TradeSignal { signal, row: *row }
    }
}
