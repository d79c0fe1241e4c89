// Engine library root: price-series cleaning, RSI/MACD computation and
// signal classification.

pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod indicator_engine;
pub mod indicators;
pub mod services;

pub use classifier::SignalClassifier;
pub use data::PriceSeries;
pub use error::EngineError;
pub use indicator_engine::IndicatorEngine;
