// src/utils/mod.rs

pub mod api_key;
pub mod timing;

pub use api_key::ApiKey;
pub use timing::OperationTimer;
