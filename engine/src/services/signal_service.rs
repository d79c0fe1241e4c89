// One pass from raw bars to a signal: clean, compute once, classify once.
use crate::classifier::SignalClassifier;
use crate::config::EngineSettings;
use crate::data::price_series::PriceSeries;
use crate::data::provider::PriceProvider;
use crate::error::EngineError;
use crate::indicator_engine::IndicatorEngine;
use shared::models::{IndicatorRow, TimeFrame, TradeSignal};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Signal(TradeSignal),
    /// Too few bars to align every indicator. Expected, not a fault.
    InsufficientData { required: usize, available: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Aligned rows, oldest first. Empty when data was insufficient.
    pub rows: Vec<IndicatorRow>,
    pub outcome: Outcome,
}

impl Analysis {
    pub fn signal(&self) -> Option<&TradeSignal> {
        match &self.outcome {
            Outcome::Signal(signal) => Some(signal),
            Outcome::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalService {
    engine: IndicatorEngine,
    classifier: SignalClassifier,
}

impl SignalService {
    pub fn new(engine: IndicatorEngine, classifier: SignalClassifier) -> Self {
        Self { engine, classifier }
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self, EngineError> {
        Ok(Self {
            engine: IndicatorEngine::new(settings.indicators.clone())?,
            classifier: SignalClassifier::new(settings.thresholds)?,
        })
    }

    pub fn analyze(&self, series: &PriceSeries) -> Result<Analysis, EngineError> {
        let rows = self.engine.compute(series)?;
        let Some(latest) = rows.last() else {
            return Ok(Analysis {
                rows,
                outcome: Outcome::InsufficientData {
                    required: self.engine.min_len(),
                    available: series.len(),
                },
            });
        };

        let trade_signal = self.classifier.classify(latest);
        tracing::info!(
            signal = ?trade_signal.signal,
            close = latest.close,
            rsi = latest.rsi,
            macd = latest.macd,
            signal_line = latest.signal_line,
            "Classified latest row"
        );
        Ok(Analysis { rows, outcome: Outcome::Signal(trade_signal) })
    }

    pub fn analyze_symbol(
        &self,
        provider: &dyn PriceProvider,
        symbol: &str,
        timeframe: TimeFrame,
    ) -> Result<Analysis, EngineError> {
        let raw = provider.fetch_bars(symbol, timeframe)?;
        tracing::debug!(%symbol, %timeframe, bars = raw.len(), "Fetched raw bars");
        let series = PriceSeries::from_bars(&raw)?;
        self.analyze(&series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndicatorConfig, Thresholds};
    use crate::data::market_data::MarketDataStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use shared::models::{RawBar, Signal};

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn raw_bars(closes: impl IntoIterator<Item = f64>) -> Vec<RawBar> {
        closes
            .into_iter()
            .enumerate()
            .map(|(i, c)| RawBar::new(ts(i as i64), Some(c)))
            .collect()
    }

    #[test]
    fn test_analyze_insufficient() {
        let series = PriceSeries::from_bars(&raw_bars((0..10).map(f64::from))).unwrap();
        let analysis = SignalService::default().analyze(&series).unwrap();
        assert!(analysis.rows.is_empty());
        assert_eq!(analysis.outcome, Outcome::InsufficientData { required: 35, available: 10 });
        assert!(analysis.signal().is_none());
    }

    #[test]
    fn test_analyze_classifies_latest_row() {
        // flat then a steady rise: MACD above its signal line, RSI pinned at 100
        let closes = (0..40).map(|i| if i < 20 { 100.0 } else { 100.0 + (i - 19) as f64 });
        let series = PriceSeries::from_bars(&raw_bars(closes)).unwrap();
        let analysis = SignalService::default().analyze(&series).unwrap();
        let signal = analysis.signal().unwrap();
        assert_eq!(signal.row, *analysis.rows.last().unwrap());
        assert!(signal.row.macd > signal.row.signal_line);
        assert_eq!(signal.row.rsi, 100.0);
        // RSI above overbought blocks the buy
        assert_eq!(signal.signal, Signal::Hold);

        let relaxed = SignalService::from_settings(&EngineSettings {
            indicators: IndicatorConfig::default(),
            thresholds: Thresholds { overbought: 100.0, oversold: 30.0 },
        })
        .unwrap();
        // rsi == overbought still falls through
        assert_eq!(relaxed.analyze(&series).unwrap().signal().unwrap().signal, Signal::Hold);
    }

    #[test]
    fn test_analyze_symbol_from_store() {
        let mut store = MarketDataStore::new();
        let closes = (0..60).map(|i| 200.0 - i as f64 * 0.5 + if i % 2 == 0 { 0.3 } else { 0.0 });
        store.add_bars("ETH-USD", TimeFrame::Hour1, raw_bars(closes));
        let analysis = SignalService::default()
            .analyze_symbol(&store, "ETH-USD", TimeFrame::Hour1)
            .unwrap();
        assert_eq!(analysis.rows.len(), 60 - 33);
        let signal = analysis.signal().unwrap();
        assert!(signal.row.rsi < 50.0);
    }

    #[test]
    fn test_analyze_symbol_propagates_invalid_series() {
        let mut store = MarketDataStore::new();
        store.add_bars("BTC-USD", TimeFrame::Day1, vec![RawBar::new(ts(0), None)]);
        let err = SignalService::default()
            .analyze_symbol(&store, "BTC-USD", TimeFrame::Day1)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));
    }
}
