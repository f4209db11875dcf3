// src/config/mod.rs

pub mod app;
pub mod environment;
pub mod loader;
pub mod validation;

pub use app::{ApiConfig, AppConfig, BatchConfig, ServerConfig, DEFAULT_ENDPOINT};
pub use environment::EnvironmentConfig;
pub use loader::{load_config, load_from_str};
pub use validation::ConfigValidator;
