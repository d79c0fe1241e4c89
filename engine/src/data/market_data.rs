// In-memory price provider, for callers that already hold bars in memory.
use super::provider::{trim_to_lookback, PriceProvider};
use crate::error::EngineError;
use shared::models::{RawBar, TimeFrame};
use std::collections::HashMap;

pub struct MarketDataStore {
    // Bars are kept raw; ordering, duplicates and gaps are resolved when a
    // PriceSeries is built from them.
    data: HashMap<String, HashMap<TimeFrame, Vec<RawBar>>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    pub fn add_bars(&mut self, symbol: &str, timeframe: TimeFrame, new_bars: Vec<RawBar>) {
        let symbol_data = self.data.entry(symbol.to_string()).or_default();
        symbol_data.entry(timeframe).or_default().extend(new_bars);
    }

    pub fn get_bars(&self, symbol: &str, timeframe: TimeFrame) -> Option<&[RawBar]> {
        self.data
            .get(symbol)
            .and_then(|symbol_data| symbol_data.get(&timeframe))
            .map(Vec::as_slice)
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceProvider for MarketDataStore {
    fn fetch_bars(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<RawBar>, EngineError> {
        let bars = self
            .get_bars(symbol, timeframe)
            .filter(|bars| !bars.is_empty())
            .map(<[RawBar]>::to_vec)
            .ok_or_else(|| {
                EngineError::ProviderError(format!(
                    "No price data found for symbol '{}' and timeframe {}",
                    symbol, timeframe
                ))
            })?;
        Ok(trim_to_lookback(bars, timeframe))
    }
}
