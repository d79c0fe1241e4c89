// RSI + MACD computation over a cleaned price series, aligned into rows.
use crate::config::IndicatorConfig;
use crate::data::price_series::PriceSeries;
use crate::error::EngineError;
use crate::indicators::{IndicatorCalculator, Macd, Rsi};
use shared::models::IndicatorRow;

/// Stateless apart from its configuration; every `compute` call is an
/// independent transformation of the series it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self { config: IndicatorConfig::default() }
    }
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn min_len(&self) -> usize {
        self.config.min_len()
    }

    /// Rows for every bar where RSI, MACD and the signal line are all defined.
    ///
    /// A non-finite close fails with `CorruptInput` regardless of length.
    /// Otherwise a series shorter than [`IndicatorEngine::min_len`] yields an
    /// empty vector, or `InsufficientData` when the engine runs in strict mode.
    /// Indicator values that overflow to a non-finite number are also
    /// `CorruptInput`, never emitted.
    pub fn compute(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>, EngineError> {
        let bad_close = series.bars().iter().enumerate().find(|(_, b)| !b.close.is_finite());
        if let Some((index, bar)) = bad_close {
            tracing::error!(
                index,
                timestamp = %bar.timestamp,
                close = bar.close,
                "Non-finite close reached indicator engine"
            );
            return Err(EngineError::CorruptInput { index, value: bar.close });
        }

        let required = self.min_len();
        let available = series.len();
        if available < required {
            tracing::debug!(
                required,
                available,
                strict = self.config.strict,
                "Series below minimum window"
            );
            return self.insufficient(required, available);
        }

        let closes = series.closes();
        let rsi_calc = Rsi::new(self.config.rsi_period);
        let macd_calc =
            Macd::new(self.config.macd_fast, self.config.macd_slow, self.config.macd_signal);
        tracing::debug!(
            rsi = %rsi_calc.parameters(),
            macd = %macd_calc.parameters(),
            bars = closes.len(),
            "Computing indicators"
        );

        let rsi_values = rsi_calc.calculate(&closes);
        let lines = macd_calc.calculate_lines(&closes);

        let mut rows = Vec::with_capacity(closes.len());
        for (i, bar) in series.bars().iter().enumerate() {
            let (rsi, macd, signal_line) = match (rsi_values[i], lines.macd[i], lines.signal[i]) {
                (Some(rsi), Some(macd), Some(signal_line)) => (rsi, macd, signal_line),
                _ => continue,
            };
            if let Some(value) = [rsi, macd, signal_line].into_iter().find(|v| !v.is_finite()) {
                tracing::error!(
                    index = i,
                    timestamp = %bar.timestamp,
                    rsi,
                    macd,
                    signal_line,
                    "Indicator arithmetic overflowed"
                );
                return Err(EngineError::CorruptInput { index: i, value });
            }
            rows.push(IndicatorRow {
                timestamp: bar.timestamp,
                close: bar.close,
                rsi,
                macd,
                signal_line,
            });
        }

        if rows.is_empty() {
            return self.insufficient(required, available);
        }
        tracing::debug!(rows = rows.len(), "Aligned indicator rows");
        Ok(rows)
    }

    fn insufficient(
        &self,
        required: usize,
        available: usize,
    ) -> Result<Vec<IndicatorRow>, EngineError> {
        if self.config.strict {
            Err(EngineError::InsufficientData { required, available })
        } else {
            Ok(Vec::new())
        }
    }
}
