mod config;

pub use config::{ConfigError, SluiceConfig};
