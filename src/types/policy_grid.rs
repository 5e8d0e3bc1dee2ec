use std::collections::HashMap;
use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::errors::EngineError;
use crate::types::engine_settings::EngineSettings;
use crate::types::instrument::Instrument;

/// Ordered shield half-lives under evaluation for one instrument.
///
/// Order is significant: policies and report rows follow it one to one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyGrid {
    pub shield_half_life_secs: Vec<f64>,
}

impl PolicyGrid {
    pub fn new(shield_half_life_secs: Vec<f64>) -> Result<Self> {
        let grid = Self {
            shield_half_life_secs,
        };
        grid.validate()?;

        Ok(grid)
    }

    pub fn from_config(instrument: &Instrument) -> Result<(Self, EngineSettings)> {
        let config = GridConfig::load()?;
        let grid = config.policy_grid(instrument)?;

        Ok((grid, config.engine))
    }

    pub fn half_lives(&self) -> &[f64] {
        &self.shield_half_life_secs
    }

    pub fn len(&self) -> usize {
        self.shield_half_life_secs.len()
    }

    fn validate(&self) -> Result<()> {
        if self.shield_half_life_secs.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                reason: "shield_half_life_secs must not be empty".to_string(),
            }
            .into());
        }
        for half_life in &self.shield_half_life_secs {
            if !half_life.is_finite() || *half_life <= 0.0 {
                return Err(EngineError::InvalidConfiguration {
                    reason: format!("half-life {half_life} must be finite and > 0"),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    pub policy_grids: HashMap<String, PolicyGrid>,

    #[serde(default)]
    pub engine: EngineSettings,
}

static CONFIG: OnceCell<GridConfig> = OnceCell::new();

impl GridConfig {
    const FILE_NAME: &'static str = "policy_grid.yml";
    const FILE_ENV: &'static str = "POLICY_GRID_FILE";

    fn load() -> Result<&'static GridConfig> {
        CONFIG.get_or_try_init(|| {
            let path = env::var(Self::FILE_ENV).unwrap_or_else(|_| Self::FILE_NAME.to_string());
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read policy grid {path}"))?;

            Self::from_yaml(&raw).with_context(|| format!("failed to load policy grid {path}"))
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: GridConfig =
            serde_yaml::from_str(raw).context("failed to parse policy grid yaml")?;

        config
            .validate()
            .context("policy grid config validation failed")?;

        Ok(config)
    }

    pub fn policy_grid(&self, instrument: &Instrument) -> Result<PolicyGrid> {
        self.policy_grids
            .get(instrument.symbol())
            .cloned()
            .ok_or_else(|| {
                EngineError::ConfigurationMissing {
                    symbol: instrument.symbol().to_string(),
                }
                .into()
            })
    }

    fn validate(&self) -> Result<()> {
        if self.policy_grids.is_empty() {
            bail!("policy_grids must not be empty");
        }
        for (symbol, grid) in &self.policy_grids {
            grid.validate()
                .with_context(|| format!("invalid policy grid for {symbol}"))?;
        }
        self.engine.validate().context("invalid engine settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
policy_grids:
  BTCUSDT:
    shield_half_life_secs: [10, 1, 0.5, 30]
  ETHUSDT:
    shield_half_life_secs: [2]
engine:
  edge_buffer: 0.001
"#;

    #[test]
    fn preserves_grid_order() {
        let config = GridConfig::from_yaml(YAML).unwrap();
        let grid = config
            .policy_grid(&Instrument::new("btcusdt").unwrap())
            .unwrap();
        assert_eq!(grid.half_lives(), &[10.0, 1.0, 0.5, 30.0]);
        assert_eq!(config.engine.edge_buffer, 0.001);
        assert_eq!(config.engine.window_ms, 1_000);
    }

    #[test]
    fn missing_instrument_is_configuration_missing() {
        let config = GridConfig::from_yaml(YAML).unwrap();
        let error = config
            .policy_grid(&Instrument::new("SOLUSDT").unwrap())
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<EngineError>(),
            Some(&EngineError::ConfigurationMissing {
                symbol: "SOLUSDT".to_string()
            })
        );
    }

    #[test]
    fn rejects_non_positive_half_life() {
        let yaml = "policy_grids:\n  BTCUSDT:\n    shield_half_life_secs: [1, 0]\n";
        assert!(GridConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(PolicyGrid::new(Vec::new()).is_err());
        assert!(PolicyGrid::new(vec![1.0, 5.0]).is_ok());
    }
}
