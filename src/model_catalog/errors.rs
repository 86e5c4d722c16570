//! # Model Catalog Error Types
//!
//! Errors raised while loading model definitions from YAML and while looking
//! models up at translation time.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelCatalogError {
    #[error("No model schema found for `{model}`")]
    Model { model: String },
    #[error("Failed to read configuration file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse configuration: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}
