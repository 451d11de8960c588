//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ANTHROPIC_API_KEY` - Model API key for the chat widget
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 0.0.0.0)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `LLM_MODEL` - Conversation model ID (default: claude-sonnet-4-20250514)
//! - `LLM_CLASSIFIER_MODEL` - Classifier model ID (default: claude-3-5-haiku-latest)
//! - `CHAT_RATE_LIMIT_PER_SECOND` - Token refill rate for the chat endpoint (default: 2)
//! - `CHAT_RATE_LIMIT_BURST` - Burst size for the chat endpoint (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` / `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (business identity, surfaced by the chat sales handler)
//! - `COMPANY_NAME`, `COMPANY_EMAIL`, `COMPANY_PHONE`, `COMPANY_ADDRESS`
//! - `BANK_NAME`, `BANK_ACCOUNT_NAME`, `BANK_ACCOUNT_NUMBER`, `BANK_CURRENCY`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_CLASSIFIER_MODEL: &str = "claude-3-5-haiku-latest";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Model API configuration
    pub llm: LlmConfig,
    /// Business identity returned by the `get_business_info` tool
    pub business: BusinessConfig,
    /// Chat endpoint rate limiting
    pub chat_rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Model API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LlmConfig {
    /// API key
    pub api_key: SecretString,
    /// Conversation model ID
    pub model: String,
    /// Classifier model ID (cheap, used for single-label completions)
    pub classifier_model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("classifier_model", &self.classifier_model)
            .finish()
    }
}

/// Company and bank details surfaced to chat visitors and stamped onto
/// invoices as a snapshot.
#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub bank_name: String,
    pub bank_account_name: String,
    pub bank_account_number: String,
    pub bank_currency: String,
}

/// Rate limiting parameters for the public chat endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Token refill rate per second.
    pub per_second: u64,
    /// Burst size.
    pub burst: u32,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = get_env_or_default("SITE_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;

        let llm = LlmConfig::from_env()?;
        let business = BusinessConfig::from_env();
        let chat_rate_limit = RateLimitConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            llm,
            business,
            chat_rate_limit,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the model API configuration.
    #[must_use]
    pub const fn llm(&self) -> &LlmConfig {
        &self.llm
    }

    /// Returns a reference to the business identity configuration.
    #[must_use]
    pub const fn business(&self) -> &BusinessConfig {
        &self.business
    }
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("ANTHROPIC_API_KEY")?,
            model: get_env_or_default("LLM_MODEL", DEFAULT_MODEL),
            classifier_model: get_env_or_default("LLM_CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL),
        })
    }
}

impl BusinessConfig {
    /// Load business identity from environment with placeholder defaults.
    ///
    /// Operators override these per deployment; none of them are secrets.
    fn from_env() -> Self {
        Self {
            company_name: get_env_or_default("COMPANY_NAME", "Harvestline Trading Ltd."),
            email: get_env_or_default("COMPANY_EMAIL", "sales@harvestline.example"),
            phone: get_env_or_default("COMPANY_PHONE", "+254 700 000 000"),
            address: get_env_or_default("COMPANY_ADDRESS", "Industrial Area, Nairobi, Kenya"),
            bank_name: get_env_or_default("BANK_NAME", "Equity Bank"),
            bank_account_name: get_env_or_default("BANK_ACCOUNT_NAME", "Harvestline Trading Ltd."),
            bank_account_number: get_env_or_default("BANK_ACCOUNT_NUMBER", "0000000000"),
            bank_currency: get_env_or_default("BANK_CURRENCY", "USD"),
        }
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let per_second = get_env_or_default("CHAT_RATE_LIMIT_PER_SECOND", "2")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CHAT_RATE_LIMIT_PER_SECOND".to_string(), e.to_string())
            })?;
        let burst = get_env_or_default("CHAT_RATE_LIMIT_BURST", "5")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CHAT_RATE_LIMIT_BURST".to_string(), e.to_string())
            })?;
        Ok(Self { per_second, burst })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_llm_config_debug_redacts_secrets() {
        let config = LlmConfig {
            api_key: SecretString::from("sk-ant-super-secret-key"),
            model: DEFAULT_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-ant-super-secret-key"));
        assert!(debug_output.contains(DEFAULT_MODEL));
    }
}
