// Price retrieval seam. The engine only ever sees the bars a provider returns;
// freshness and caching are the provider's business.
use super::csv_parser::PriceCsvParser;
use crate::error::EngineError;
use shared::models::{RawBar, TimeFrame};
use std::path::PathBuf;

pub trait PriceProvider {
    /// Raw bars for `symbol` at `timeframe`, in whatever order the source has them.
    fn fetch_bars(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<RawBar>, EngineError>;
}

/// Keeps only bars inside the timeframe's lookback window, measured back from
/// the newest bar.
pub fn trim_to_lookback(bars: Vec<RawBar>, timeframe: TimeFrame) -> Vec<RawBar> {
    let Some(latest) = bars.iter().map(|b| b.timestamp).max() else {
        return bars;
    };
    let cutoff = latest - timeframe.lookback();
    bars.into_iter().filter(|b| b.timestamp >= cutoff).collect()
}

/// Reads bars from a local delimited file.
pub struct CsvPriceProvider {
    path: PathBuf,
    delimiter: u8,
}

impl CsvPriceProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl PriceProvider for CsvPriceProvider {
    fn fetch_bars(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<RawBar>, EngineError> {
        let path = self.path.to_string_lossy();
        let rows =
            PriceCsvParser::load_rows_from_csv(&path, self.delimiter).map_err(map_csv_error)?;

        let has_symbols = rows.iter().any(|r| r.symbol.is_some());
        let bars: Vec<RawBar> = rows
            .into_iter()
            .filter(|r| {
                !has_symbols
                    || r.symbol
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
            })
            .map(|r| r.bar)
            .collect();

        if has_symbols && bars.is_empty() {
            return Err(EngineError::ProviderError(format!(
                "No price data found for symbol '{}' in '{}'",
                symbol, path
            )));
        }

        let total = bars.len();
        let bars = trim_to_lookback(bars, timeframe);
        tracing::debug!(
            %symbol,
            %timeframe,
            path = %path,
            loaded = total,
            kept = bars.len(),
            "Fetched bars from CSV"
        );
        Ok(bars)
    }
}

fn map_csv_error(err: anyhow::Error) -> EngineError {
    let err = match err.downcast::<csv::Error>() {
        Ok(csv_err) => return csv_err.into(),
        Err(err) => err,
    };
    match err.downcast::<std::io::Error>() {
        Ok(io_err) => io_err.into(),
        Err(err) => EngineError::CsvDataFormatError(err.to_string()),
    }
}
