mod app_config;

pub use app_config::{AppConfig, KeyConfig, LogFormat, LoggingConfig, ScopeConfig, TokenConfig};
