//! Env-driven API configuration.
//!
//! The engine itself takes an explicit [`ApiConfig`]; this module only
//! provides the conventional way to build one from the process environment
//! (demo pages, smoke tools).

use crate::error::ConfigError;

const DEFAULT_GEOCODE_URL: &str = "https://api.geoapify.com/v1/geocode/autocomplete";
const DEFAULT_DETAILS_URL: &str = "https://api.geoapify.com/v2/place-details";
const DEFAULT_PLACES_URL: &str = "https://api.geoapify.com/v2/places";
const DEFAULT_IP_URL: &str = "https://api.geoapify.com/v1/ipinfo";

/// Connection settings for the geocoding API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub geocode_url: String,
    pub details_url: String,
    pub places_url: String,
    pub ip_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl ApiConfig {
    /// Builds a config with production endpoint defaults for the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            geocode_url: DEFAULT_GEOCODE_URL.to_owned(),
            details_url: DEFAULT_DETAILS_URL.to_owned(),
            places_url: DEFAULT_PLACES_URL.to_owned(),
            ip_url: DEFAULT_IP_URL.to_owned(),
            request_timeout_secs: 30,
            user_agent: "placefinder/0.1 (autocomplete)".to_owned(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to load `.env` files first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PLACEFINDER_API_KEY` is missing or a
    /// numeric value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Loads configuration from env vars already in the process, without
    /// touching `.env` files. Useful for tests and managed environments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if required env vars are missing or invalid.
    pub fn from_env_only() -> Result<Self, ConfigError> {
        build_config(|key| std::env::var(key))
    }
}

/// Core parsing/validation, decoupled from the real environment so it can be
/// tested with a plain map lookup.
fn build_config<F>(lookup: F) -> Result<ApiConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_owned()))
    };
    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_owned()) };
    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    let api_key = require("PLACEFINDER_API_KEY")?;
    let geocode_url = or_default("PLACEFINDER_GEOCODE_URL", DEFAULT_GEOCODE_URL);
    let details_url = or_default("PLACEFINDER_DETAILS_URL", DEFAULT_DETAILS_URL);
    let places_url = or_default("PLACEFINDER_PLACES_URL", DEFAULT_PLACES_URL);
    let ip_url = or_default("PLACEFINDER_IP_URL", DEFAULT_IP_URL);
    let request_timeout_secs = parse_u64("PLACEFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "PLACEFINDER_USER_AGENT",
        "placefinder/0.1 (autocomplete)",
    );

    Ok(ApiConfig {
        api_key,
        geocode_url,
        details_url,
        places_url,
        ip_url,
        request_timeout_secs,
        user_agent,
    })
}
