use crate::constants;
use crate::error::{Result, RiskError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub model: ModelConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
    pub countries: CountriesConfig,
}

/// Where each table is read from: an http(s) URL or a local path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub elvis: String,
    pub election_dates: String,
    pub reign: String,
    pub boundaries: String,
    pub upcoming: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            elvis: constants::DEFAULT_ELVIS_URL.to_string(),
            election_dates: constants::DEFAULT_ELECTION_DATES_URL.to_string(),
            reign: constants::DEFAULT_REIGN_URL.to_string(),
            boundaries: constants::DEFAULT_BOUNDARIES_URL.to_string(),
            upcoming: constants::DEFAULT_UPCOMING_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// No timeout unless set.
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: format!("election_risk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Inverse regularization strength.
    pub regularization_c: f64,
    /// Share of rows held out of the fit.
    pub test_size: f64,
    pub seed: u64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            regularization_c: 1e6,
            test_size: 0.9,
            seed: 101,
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Panel year shown on the map.
    pub year: i32,
    /// Month used for countries without an election in the static view.
    pub static_month: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            year: 2018,
            static_month: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountriesConfig {
    /// Raw name -> canonical name, merged over the built-in aliases.
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Load from `path`, or from `config.toml` when it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            RiskError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if !(model.regularization_c.is_finite() && model.regularization_c > 0.0) {
            return Err(RiskError::Config(format!(
                "model.regularization_c must be positive, got {}",
                model.regularization_c
            )));
        }
        if !(0.0..1.0).contains(&model.test_size) {
            return Err(RiskError::Config(format!(
                "model.test_size must be in [0, 1), got {}",
                model.test_size
            )));
        }
        if model.max_iterations == 0 {
            return Err(RiskError::Config(
                "model.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(1..=12).contains(&self.map.static_month) {
            return Err(RiskError::Config(format!(
                "map.static_month must be 1-12, got {}",
                self.map.static_month
            )));
        }
        Ok(())
    }
}
