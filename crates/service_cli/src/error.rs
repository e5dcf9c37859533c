//! CLI error types

use pricer_core::types::PricingError;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse job file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_conversion() {
        let err: CliError = PricingError::invalid("steps must be positive").into();
        assert!(matches!(err, CliError::Pricing(_)));
        assert!(err.to_string().starts_with("Pricing failed"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("[lattice\nspot = ");
        let err: CliError = parse.unwrap_err().into();
        assert!(matches!(err, CliError::Toml(_)));
    }
}
