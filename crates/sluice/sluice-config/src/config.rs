use serde::Deserialize;
use sluice_queue::RingConfig;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SluiceConfig {
    #[serde(default = "defaults::ring")]
    pub ring: RingConfig,
    #[serde(default = "defaults::producers")]
    pub producers: usize,
    #[serde(default = "defaults::items_per_producer")]
    pub items_per_producer: u64,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

mod defaults {
    use sluice_queue::RingConfig;

    pub fn ring() -> RingConfig {
        RingConfig::new(128)
    }

    pub fn producers() -> usize {
        4
    }

    pub fn items_per_producer() -> u64 {
        1_000_000
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl Default for SluiceConfig {
    fn default() -> Self {
        Self {
            ring: defaults::ring(),
            producers: defaults::producers(),
            items_per_producer: defaults::items_per_producer(),
            log_level: defaults::log_level(),
        }
    }
}

impl SluiceConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&toml_to_str)
    }

    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SluiceConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Ring capacity is already checked while deserialising the `[ring]` table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producers == 0 {
            return Err(ConfigError::Invalid("producers must be non-zero"));
        }
        Ok(())
    }
}
