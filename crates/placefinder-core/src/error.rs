use thiserror::Error;

/// Errors raised while loading API configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but its value cannot be parsed.
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
