//! Configuration management for the AlephX client layer

use crate::errors::{AlephxError, Result};
use crate::exchange::{AlephxApi, RATE_LIMIT_MS};
use std::env;
use std::fmt;

/// Authentication material for private endpoints.
///
/// Precedence when signing: explicit `authorization` header, then bearer
/// `token` (only when the key/secret pair is incomplete), then HMAC with
/// `api_key` + `secret`.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub secret: Option<String>,
    pub token: Option<String>,
    /// Raw `Authorization` header value, passed through untouched
    pub authorization: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Both apiKey and secret are present
    pub fn has_api_credentials(&self) -> bool {
        self.api_key.is_some() && self.secret.is_some()
    }
}

// Secrets stay out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("api_key", &mask(&self.api_key))
            .field("secret", &mask(&self.secret))
            .field("token", &mask(&self.token))
            .field("authorization", &mask(&self.authorization))
            .finish()
    }
}

/// Client configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,

    /// Use the testnet host instead of production
    pub sandbox: bool,

    /// Explicit REST base URL, overrides `sandbox`
    pub rest_url_override: Option<String>,

    /// Milliseconds per unit of endpoint cost
    pub rate_limit_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            sandbox: false,
            rest_url_override: None,
            rate_limit_ms: RATE_LIMIT_MS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let credentials = Credentials {
            api_key: var("ALEPHX_API_KEY"),
            secret: var("ALEPHX_SECRET"),
            token: var("ALEPHX_TOKEN"),
            authorization: var("ALEPHX_AUTHORIZATION"),
        };

        let sandbox = var("ALEPHX_SANDBOX")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let rest_url_override = var("ALEPHX_REST_URL").map(|url| url.trim_end_matches('/').to_string());

        let rate_limit_ms = match var("ALEPHX_RATE_LIMIT_MS") {
            Some(v) => v
                .parse()
                .map_err(|_| AlephxError::Config(format!("ALEPHX_RATE_LIMIT_MS must be an integer, got '{}'", v)))?,
            None => RATE_LIMIT_MS,
        };

        // Validate configuration
        if credentials.api_key.is_some() != credentials.secret.is_some() {
            return Err(AlephxError::Config(
                "ALEPHX_API_KEY and ALEPHX_SECRET must be set together".to_string(),
            ));
        }
        if rate_limit_ms == 0 {
            return Err(AlephxError::Config(
                "ALEPHX_RATE_LIMIT_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            credentials,
            sandbox,
            rest_url_override,
            rate_limit_ms,
        })
    }

    /// REST base URL in effect
    pub fn rest_url(&self) -> &str {
        self.rest_url_override
            .as_deref()
            .unwrap_or_else(|| AlephxApi::rest_url(self.sandbox))
    }
}
