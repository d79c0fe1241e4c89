// Engine settings: indicator periods and classification thresholds, loaded
// from an optional JSON file and overridden by command line flags.
use crate::error::EngineError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Surface too-short series as `InsufficientData` instead of empty output.
    pub strict: bool,
    /// Optional stricter minimum bar count. Never below the derived window.
    pub min_bars: Option<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            strict: false,
            min_bars: None,
        }
    }
}

impl IndicatorConfig {
    /// Smallest series length for which every indicator can be aligned:
    /// `max(rsi_period, macd_slow) + macd_signal`.
    pub fn derived_min_len(&self) -> usize {
        self.rsi_period.max(self.macd_slow) + self.macd_signal
    }

    /// Effective gate, honouring a configured stricter threshold.
    pub fn min_len(&self) -> usize {
        let derived = self.derived_min_len();
        self.min_bars.map_or(derived, |m| m.max(derived))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rsi_period == 0
            || self.macd_fast == 0
            || self.macd_slow == 0
            || self.macd_signal == 0
        {
            return Err(EngineError::ConfigError(
                "Indicator periods must be greater than 0".to_string(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(EngineError::ConfigError(format!(
                "macd_fast ({}) must be smaller than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if let Some(min_bars) = self.min_bars {
            if min_bars < self.derived_min_len() {
                return Err(EngineError::ConfigError(format!(
                    "min_bars ({}) cannot be below the derived minimum window ({})",
                    min_bars,
                    self.derived_min_len()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { overbought: 70.0, oversold: 30.0 }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), EngineError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.overbought) || !in_range(self.oversold) {
            return Err(EngineError::ConfigError(format!(
                "RSI thresholds must lie within [0, 100], got overbought={} oversold={}",
                self.overbought, self.oversold
            )));
        }
        if self.oversold >= self.overbought {
            return Err(EngineError::ConfigError(format!(
                "oversold ({}) must be below overbought ({})",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub indicators: IndicatorConfig,
    pub thresholds: Thresholds,
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(json)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.indicators.validate()?;
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.indicators.rsi_period, 14);
        assert_eq!(settings.indicators.macd_fast, 12);
        assert_eq!(settings.indicators.macd_slow, 26);
        assert_eq!(settings.indicators.macd_signal, 9);
        assert_eq!(settings.indicators.min_len(), 35);
        assert_eq!(settings.thresholds, Thresholds { overbought: 70.0, oversold: 30.0 });
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_min_len_uses_larger_period() {
        let config = IndicatorConfig { rsi_period: 30, ..IndicatorConfig::default() };
        assert_eq!(config.derived_min_len(), 39);
        let config = IndicatorConfig { min_bars: Some(50), ..IndicatorConfig::default() };
        assert_eq!(config.min_len(), 50);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            EngineSettings::from_json_str(r#"{ "indicators": { "rsi_period": 7 } }"#).unwrap();
        assert_eq!(settings.indicators.rsi_period, 7);
        assert_eq!(settings.indicators.macd_slow, 26);
        assert_eq!(settings.thresholds.overbought, 70.0);
    }

    #[test]
    fn test_rejects_zero_period() {
        let err =
            EngineSettings::from_json_str(r#"{ "indicators": { "macd_signal": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_rejects_fast_not_below_slow() {
        let config = IndicatorConfig { macd_fast: 26, macd_slow: 26, ..IndicatorConfig::default() };
        assert!(matches!(config.validate(), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_min_bars_below_window() {
        let config = IndicatorConfig { min_bars: Some(20), ..IndicatorConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let thresholds = Thresholds { overbought: 30.0, oversold: 70.0 };
        assert!(thresholds.validate().is_err());
        let thresholds = Thresholds { overbought: 120.0, oversold: 30.0 };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{
            "indicators": { "strict": true, "min_bars": 50 },
            "thresholds": { "overbought": 80, "oversold": 20 }
        }"#;
        writeln!(file, "{}", json).unwrap();
        let settings = EngineSettings::load_from_file(file.path()).unwrap();
        assert!(settings.indicators.strict);
        assert_eq!(settings.indicators.min_len(), 50);
        assert_eq!(settings.thresholds.overbought, 80.0);
        assert_eq!(settings.thresholds.oversold, 20.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineSettings::load_from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }
}
