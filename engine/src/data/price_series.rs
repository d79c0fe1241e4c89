// Cleaned, chronologically ordered close-price series.
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use shared::models::{PriceBar, RawBar};

/// Ordered, deduplicated close prices. Immutable once built.
///
/// Cleaning policy applied by [`PriceSeries::from_bars`]:
/// - bars are ordered by timestamp; on duplicate timestamps the later
///   occurrence in the input wins;
/// - a missing or non-finite close is forward-filled from the last valid
///   close, or dropped when there is no prior valid close.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn from_bars(raw: &[RawBar]) -> Result<Self, EngineError> {
        if raw.is_empty() {
            return Err(EngineError::InvalidSeries("no bars supplied".to_string()));
        }

        // Stable sort keeps duplicates in input order, so the last one of each
        // run is the later occurrence.
        let mut ordered: Vec<RawBar> = raw.to_vec();
        ordered.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<RawBar> = Vec::with_capacity(ordered.len());
        for bar in ordered {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => {
                    tracing::warn!(
                        timestamp = %bar.timestamp,
                        "Duplicate timestamp, keeping later bar"
                    );
                    *last = bar;
                }
                _ => deduped.push(bar),
            }
        }

        let mut bars = Vec::with_capacity(deduped.len());
        let mut last_valid: Option<f64> = None;
        let mut filled = 0usize;
        let mut dropped = 0usize;
        for bar in deduped {
            let close = match bar.close.filter(|c| c.is_finite()) {
                Some(close) => {
                    last_valid = Some(close);
                    close
                }
                None => match last_valid {
                    Some(prev) => {
                        filled += 1;
                        prev
                    }
                    None => {
                        dropped += 1;
                        continue;
                    }
                },
            };
            bars.push(PriceBar { timestamp: bar.timestamp, close });
        }

        if filled > 0 || dropped > 0 {
            tracing::warn!(filled, dropped, "Cleaned missing close prices");
        }
        if bars.is_empty() {
            return Err(EngineError::InvalidSeries(
                "close prices are missing or all non-finite".to_string(),
            ));
        }
        tracing::debug!(len = bars.len(), "Built price series");
        Ok(Self { bars })
    }

    /// Wraps bars that are already clean, without re-validating closes.
    /// The indicator engine still rejects non-finite values it finds here.
    pub fn from_trusted(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }
}
