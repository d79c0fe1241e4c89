pub mod settings;

pub use settings::{EngineSettings, IndicatorConfig, Thresholds};
