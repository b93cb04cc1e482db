pub mod config;
pub mod error;

pub use config::{Config, ConfigError, ConfigSeverity, ScheduleConfig, StoreConfig};
pub use error::{Error, Result};
